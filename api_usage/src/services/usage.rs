use common::error::{AppError, Res};
use db::models::{
    attempt::GenerationAttempt,
    sub::{LIMIT_UNLIMITED, Subscription},
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Remaining-generations value reported for uncapped plans.
pub const UNLIMITED_REMAINING: i64 = 9_999_999;

#[derive(Debug, Clone, Serialize)]
pub struct UsageStatus {
    pub has_active_subscription: bool,
    pub generation_count: i64,
    pub free_trial_limit: i64,
    pub remaining_generations: i64,
    pub can_generate: bool,
    pub plan: Option<String>,
    pub monthly_limit: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    MonthlyLimitReached,
    FreeTrialExhausted,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::MonthlyLimitReached => {
                "Monthly generation limit reached. Your limit resets at the next billing cycle."
            }
            DenyReason::FreeTrialExhausted => {
                "Free trial generations exhausted. Subscribe to keep rendering."
            }
        }
    }
}

/// Outcome of a pre-generation gate check. Denials carry the status so the
/// caller can build a full rejection payload.
#[derive(Debug, Clone)]
pub enum Decision {
    Allowed(UsageStatus),
    Denied(UsageStatus, DenyReason),
}

/// Computes generation eligibility for one account.
///
/// A `monthly_limit` of -1 on an active subscription means uncapped.
/// A limit of 0 (a plan with no cap configured) and the no-subscription
/// case both fall back to the free-trial limit, evaluated against the same
/// cumulative counter. Remaining counts clamp at zero.
pub fn evaluate(
    generation_count: i64,
    active_sub: Option<&Subscription>,
    free_trial_limit: i64,
) -> UsageStatus {
    let (plan, monthly_limit) = match active_sub {
        Some(sub) => (Some(sub.price_id.clone()), Some(sub.monthly_limit)),
        None => (None, None),
    };

    let (remaining, can_generate) = match active_sub.map(|s| s.monthly_limit) {
        Some(LIMIT_UNLIMITED) => (UNLIMITED_REMAINING, true),
        Some(limit) if limit > 0 => {
            let remaining = (limit as i64 - generation_count).max(0);
            (remaining, remaining > 0)
        }
        // Plan without a configured cap, or no subscription at all.
        _ => {
            let remaining = (free_trial_limit - generation_count).max(0);
            (remaining, remaining > 0)
        }
    };

    UsageStatus {
        has_active_subscription: active_sub.is_some(),
        generation_count,
        free_trial_limit,
        remaining_generations: remaining,
        can_generate,
        plan,
        monthly_limit,
    }
}

/// Read-only usage snapshot for an account. No side effects.
pub async fn get_status(pool: &PgPool, account_id: Uuid, free_trial_limit: i64) -> Res<UsageStatus> {
    let account = db::account::get_account_by_id(pool, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No account with id {}", account_id)))?;

    let active_sub = db::sub::get_active_subscription(pool, account_id).await?;

    Ok(evaluate(
        account.generation_count,
        active_sub.as_ref(),
        free_trial_limit,
    ))
}

/// Same computation as `get_status`, folded into an allow/deny decision.
/// Does NOT consume quota; incrementing is a separate step the caller takes
/// after a successful generation.
pub async fn can_generate(pool: &PgPool, account_id: Uuid, free_trial_limit: i64) -> Res<Decision> {
    let status = get_status(pool, account_id, free_trial_limit).await?;

    if status.can_generate {
        return Ok(Decision::Allowed(status));
    }

    let reason = match status.monthly_limit {
        Some(limit) if limit > 0 => DenyReason::MonthlyLimitReached,
        _ => DenyReason::FreeTrialExhausted,
    };
    Ok(Decision::Denied(status, reason))
}

/// Consumes one generation: a single atomic UPDATE at the database, so two
/// concurrent increments can never collapse into one. Returns the
/// post-increment status.
pub async fn increment(pool: &PgPool, account_id: Uuid, free_trial_limit: i64) -> Res<UsageStatus> {
    let count = db::account::increment_generation_count(pool, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No account with id {}", account_id)))?;

    let active_sub = db::sub::get_active_subscription(pool, account_id).await?;

    Ok(evaluate(count, active_sub.as_ref(), free_trial_limit))
}

/// Resolves a renewal invoice's subscription to the account whose counter
/// should reset. Unknown subscriptions yield `None` with a warning; a
/// renewal for a row we never stored must not take down the webhook.
pub fn renewal_reset_target(
    sub: Option<Subscription>,
    stripe_subscription_id: &str,
) -> Option<Uuid> {
    match sub {
        Some(sub) => Some(sub.account_id),
        None => {
            log::warn!(
                "Renewal for unknown subscription {}; skipping counter reset",
                stripe_subscription_id
            );
            None
        }
    }
}

/// Billing-cycle reset, driven by a renewal invoice. An unresolvable
/// subscription is logged and skipped: the webhook must still be
/// acknowledged, so this never fails the caller.
pub async fn reset_on_renewal(pool: &PgPool, stripe_subscription_id: &str) -> Res<()> {
    let sub = db::sub::get_subscription_by_stripe_id(pool, stripe_subscription_id).await?;
    let Some(account_id) = renewal_reset_target(sub, stripe_subscription_id) else {
        return Ok(());
    };

    db::account::reset_generation_count(pool, account_id).await?;
    log::info!(
        "Reset generation count for account {} on renewal of {}",
        account_id,
        stripe_subscription_id
    );
    Ok(())
}

/// Recent entries from the append-only generation audit log.
pub async fn history(pool: &PgPool, account_id: Uuid, limit: i64) -> Res<Vec<GenerationAttempt>> {
    if db::account::get_account_by_id(pool, account_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "No account with id {}",
            account_id
        )));
    }
    db::attempt::list_attempts(pool, account_id, limit.clamp(1, 100)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use db::models::sub::STATUS_ACTIVE;

    fn sub_with_limit(monthly_limit: i32) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            stripe_subscription_id: "sub_test".to_string(),
            status: STATUS_ACTIVE.to_string(),
            price_id: "price_pro".to_string(),
            monthly_limit,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn trial_allows_below_limit() {
        let status = evaluate(24, None, 25);
        assert!(!status.has_active_subscription);
        assert_eq!(status.remaining_generations, 1);
        assert!(status.can_generate);
    }

    #[test]
    fn trial_denies_at_limit() {
        let status = evaluate(25, None, 25);
        assert_eq!(status.remaining_generations, 0);
        assert!(!status.can_generate);
    }

    #[test]
    fn trial_remaining_clamps_at_zero() {
        let status = evaluate(40, None, 25);
        assert_eq!(status.remaining_generations, 0);
        assert!(!status.can_generate);
    }

    #[test]
    fn unlimited_plan_always_allows() {
        let sub = sub_with_limit(LIMIT_UNLIMITED);
        let status = evaluate(999_999, Some(&sub), 25);
        assert!(status.can_generate);
        assert_eq!(status.remaining_generations, UNLIMITED_REMAINING);
        assert_eq!(status.monthly_limit, Some(-1));
    }

    #[test]
    fn capped_plan_allows_below_cap() {
        let sub = sub_with_limit(10);
        let status = evaluate(9, Some(&sub), 25);
        assert!(status.can_generate);
        assert_eq!(status.remaining_generations, 1);
    }

    #[test]
    fn capped_plan_denies_at_cap() {
        let sub = sub_with_limit(10);
        let status = evaluate(10, Some(&sub), 25);
        assert!(!status.can_generate);
        assert_eq!(status.remaining_generations, 0);
    }

    #[test]
    fn zero_limit_plan_falls_back_to_trial() {
        let sub = sub_with_limit(0);
        let status = evaluate(5, Some(&sub), 25);
        assert!(status.has_active_subscription);
        assert!(status.can_generate);
        assert_eq!(status.remaining_generations, 20);
    }

    #[test]
    fn trial_equivalence_holds_for_unsubscribed_accounts() {
        for count in 0..30 {
            let status = evaluate(count, None, 25);
            assert_eq!(status.can_generate, count < 25);
            assert!(status.remaining_generations >= 0);
        }
    }

    #[test]
    fn capped_equivalence_holds_for_subscribed_accounts() {
        let sub = sub_with_limit(50);
        for count in 0..60 {
            let status = evaluate(count, Some(&sub), 25);
            assert_eq!(status.can_generate, count < 50);
            assert!(status.remaining_generations >= 0);
        }
    }

    #[test]
    fn deny_reason_for_capped_plan() {
        let sub = sub_with_limit(10);
        let status = evaluate(10, Some(&sub), 25);
        let reason = match status.monthly_limit {
            Some(limit) if limit > 0 => DenyReason::MonthlyLimitReached,
            _ => DenyReason::FreeTrialExhausted,
        };
        assert_eq!(reason, DenyReason::MonthlyLimitReached);
    }

    #[test]
    fn deny_reason_for_exhausted_trial() {
        let status = evaluate(25, None, 25);
        let reason = match status.monthly_limit {
            Some(limit) if limit > 0 => DenyReason::MonthlyLimitReached,
            _ => DenyReason::FreeTrialExhausted,
        };
        assert_eq!(reason, DenyReason::FreeTrialExhausted);
    }

    #[test]
    fn deny_reason_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&DenyReason::MonthlyLimitReached).unwrap();
        assert_eq!(json, "\"MONTHLY_LIMIT_REACHED\"");
        let json = serde_json::to_string(&DenyReason::FreeTrialExhausted).unwrap();
        assert_eq!(json, "\"FREE_TRIAL_EXHAUSTED\"");
    }

    #[test]
    fn renewal_for_unknown_subscription_resolves_to_no_reset() {
        assert_eq!(renewal_reset_target(None, "sub_gone"), None);
    }

    #[test]
    fn renewal_for_known_subscription_resolves_to_its_account() {
        let sub = sub_with_limit(10);
        let account_id = sub.account_id;
        assert_eq!(
            renewal_reset_target(Some(sub), "sub_test"),
            Some(account_id)
        );
    }

    #[test]
    fn cancellation_re_evaluates_against_trial_without_forgiveness() {
        // A canceled account keeps its cumulative counter; past-the-trial
        // usage under a paid plan leaves it barred once the plan is gone.
        let status = evaluate(120, None, 25);
        assert!(!status.can_generate);
        assert_eq!(status.remaining_generations, 0);
    }
}
