use common::error::{AppError, Res};
use db::dtos::sub::SubscriptionUpsert;
use db::models::sub::STATUS_CANCELED;
use sqlx::PgPool;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession, CustomerId, Event,
    EventObject, EventType, InvoiceBillingReason, Webhook,
};

use crate::{dtos::pay::CheckoutRequest, services::catalog::PlanCatalog};

/// Creates a subscription-mode checkout session for a customer.
pub async fn create_checkout_session(
    client: &Client,
    customer_id: CustomerId,
    req: &CheckoutRequest,
) -> Res<CheckoutSession> {
    let params = CreateCheckoutSession {
        payment_method_types: Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]),
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(req.price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(req.success_url.as_str()),
        cancel_url: Some(req.cancel_url.as_str()),
        customer: Some(customer_id),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// What a billing event means for the local ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WebhookAction {
    /// Mirror the provider subscription into the local row.
    SyncSubscription,
    /// Transition the local row to canceled.
    CancelSubscription,
    /// Reset the generation counter if the invoice is a renewal.
    MaybeResetCounter,
    Ignore,
}

fn classify_event(event_type: &EventType) -> WebhookAction {
    match event_type {
        EventType::CheckoutSessionCompleted
        | EventType::CustomerSubscriptionCreated
        | EventType::CustomerSubscriptionUpdated => WebhookAction::SyncSubscription,
        EventType::CustomerSubscriptionDeleted => WebhookAction::CancelSubscription,
        EventType::InvoicePaid => WebhookAction::MaybeResetCounter,
        _ => WebhookAction::Ignore,
    }
}

/// Only a recurring billing cycle resets the counter; the first invoice of
/// a brand-new subscription does not.
fn is_renewal(billing_reason: Option<&InvoiceBillingReason>) -> bool {
    matches!(billing_reason, Some(InvoiceBillingReason::SubscriptionCycle))
}

/// Translates billing events into subscription row mutations and, for
/// renewals, the generation-counter reset. Anomalies (unknown customers,
/// subscriptions we never saw) are logged and skipped so Stripe still gets
/// its acknowledgement.
pub async fn process_webhook_event(
    pool: &PgPool,
    client: &Client,
    catalog: &PlanCatalog,
    event: Event,
) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    match classify_event(&event.type_) {
        WebhookAction::SyncSubscription => match event.data.object {
            EventObject::CheckoutSession(session) => {
                let Some(sub_ref) = session.subscription else {
                    log::warn!(
                        "Checkout session {} completed without a subscription",
                        session.id
                    );
                    return Ok(());
                };
                let sub_id = sub_ref.id();
                let subscription = stripe::Subscription::retrieve(client, &sub_id, &[]).await?;
                apply_subscription(pool, catalog, &subscription).await?;
            }
            EventObject::Subscription(subscription) => {
                apply_subscription(pool, catalog, &subscription).await?;
            }
            _ => {}
        },
        WebhookAction::CancelSubscription => {
            if let EventObject::Subscription(subscription) = event.data.object {
                let changed = db::sub::set_subscription_status(
                    pool,
                    subscription.id.as_str(),
                    STATUS_CANCELED,
                )
                .await?;
                if changed == 0 {
                    log::warn!("Cancellation for unknown subscription {}", subscription.id);
                }
            }
        }
        WebhookAction::MaybeResetCounter => {
            if let EventObject::Invoice(invoice) = event.data.object {
                if let (true, Some(sub_ref)) =
                    (is_renewal(invoice.billing_reason.as_ref()), invoice.subscription)
                {
                    api_usage::services::usage::reset_on_renewal(pool, sub_ref.id().as_str())
                        .await?;
                }
            }
        }
        WebhookAction::Ignore => {
            log::info!("Unhandled event type: {}", event.type_);
        }
    }

    Ok(())
}

/// Upserts the local subscription row from a provider subscription object.
async fn apply_subscription(
    pool: &PgPool,
    catalog: &PlanCatalog,
    subscription: &stripe::Subscription,
) -> Res<()> {
    let customer_id = subscription.customer.id().to_string();

    let Some(account) = db::account::get_account_by_stripe_customer(pool, &customer_id).await?
    else {
        log::warn!(
            "Subscription {} references unknown customer {}; skipping",
            subscription.id,
            customer_id
        );
        return Ok(());
    };

    let price_id = subscription
        .items
        .data
        .first()
        .and_then(|item| item.price.as_ref())
        .map(|price| price.id.to_string())
        .unwrap_or_default();

    let row = db::sub::upsert_subscription(
        pool,
        SubscriptionUpsert {
            account_id: account.id,
            stripe_subscription_id: subscription.id.to_string(),
            status: subscription.status.to_string(),
            price_id: price_id.clone(),
            monthly_limit: catalog.limit_for_price(&price_id),
        },
    )
    .await?;

    log::info!(
        "Subscription {} for account {} is now {} (limit {})",
        row.stripe_subscription_id,
        row.account_id,
        row.status,
        row.monthly_limit
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_lifecycle_events_sync_the_local_row() {
        assert_eq!(
            classify_event(&EventType::CheckoutSessionCompleted),
            WebhookAction::SyncSubscription
        );
        assert_eq!(
            classify_event(&EventType::CustomerSubscriptionCreated),
            WebhookAction::SyncSubscription
        );
        assert_eq!(
            classify_event(&EventType::CustomerSubscriptionUpdated),
            WebhookAction::SyncSubscription
        );
    }

    #[test]
    fn deletion_cancels_and_invoices_may_reset() {
        assert_eq!(
            classify_event(&EventType::CustomerSubscriptionDeleted),
            WebhookAction::CancelSubscription
        );
        assert_eq!(
            classify_event(&EventType::InvoicePaid),
            WebhookAction::MaybeResetCounter
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        assert_eq!(
            classify_event(&EventType::PaymentIntentSucceeded),
            WebhookAction::Ignore
        );
        assert_eq!(
            classify_event(&EventType::CustomerCreated),
            WebhookAction::Ignore
        );
    }

    #[test]
    fn only_recurring_cycles_count_as_renewals() {
        assert!(is_renewal(Some(&InvoiceBillingReason::SubscriptionCycle)));
        assert!(!is_renewal(Some(&InvoiceBillingReason::SubscriptionCreate)));
        assert!(!is_renewal(Some(&InvoiceBillingReason::SubscriptionUpdate)));
        assert!(!is_renewal(None));
    }
}
