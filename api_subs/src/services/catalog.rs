use common::error::{AppError, Res};
use stripe::{Client, ListPrices, Price};

use crate::models::plan::SubscriptionPlan;

/// Plan catalog loaded from Stripe at startup. Webhook translation resolves
/// each subscription's generation cap through it.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<SubscriptionPlan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<SubscriptionPlan>) -> Self {
        Self { plans }
    }

    pub fn plans(&self) -> &[SubscriptionPlan] {
        &self.plans
    }

    /// Cap for a price id. Unknown prices get 0, i.e. the free-trial
    /// default, rather than failing the webhook.
    pub fn limit_for_price(&self, price_id: &str) -> i32 {
        self.plans
            .iter()
            .find(|plan| plan.price_id == price_id)
            .map(|plan| plan.monthly_limit)
            .unwrap_or(0)
    }
}

/// Reads a plan's generation cap from the Stripe product metadata key
/// `monthly_limit`. Missing or malformed values mean "no cap configured".
pub fn monthly_limit_from_metadata(value: Option<&String>) -> i32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Fetches all active recurring prices and their products from Stripe.
pub async fn fetch_plans(client: &Client) -> Res<Vec<SubscriptionPlan>> {
    let params = ListPrices {
        active: Some(true),
        limit: Some(100),
        expand: &["data.product"],
        ..Default::default()
    };

    let prices = Price::list(client, &params).await.map_err(AppError::from)?;

    let plans = prices
        .data
        .into_iter()
        .filter_map(|price| {
            if price.type_ != Some(stripe::PriceType::Recurring) {
                return None;
            }

            let recurring = price.recurring?;
            let product_obj = price.product.as_ref().and_then(|p| p.as_object())?;

            let monthly_limit = monthly_limit_from_metadata(
                product_obj
                    .metadata
                    .as_ref()
                    .and_then(|meta| meta.get("monthly_limit")),
            );

            Some(SubscriptionPlan {
                price_id: price.id.to_string(),
                name: product_obj.name.clone().unwrap_or_default(),
                description: product_obj.description.clone().unwrap_or_default(),
                price: price.unit_amount.unwrap_or(0),
                currency: price.currency.unwrap_or_default().to_string(),
                interval: recurring.interval.to_string(),
                monthly_limit,
            })
        })
        .collect();

    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(price_id: &str, monthly_limit: i32) -> SubscriptionPlan {
        SubscriptionPlan {
            price_id: price_id.to_string(),
            name: "Pro".to_string(),
            description: String::new(),
            price: 4900,
            currency: "usd".to_string(),
            interval: "month".to_string(),
            monthly_limit,
        }
    }

    #[test]
    fn metadata_limit_parses_integers() {
        assert_eq!(monthly_limit_from_metadata(Some(&"150".to_string())), 150);
        assert_eq!(monthly_limit_from_metadata(Some(&"-1".to_string())), -1);
    }

    #[test]
    fn metadata_limit_defaults_to_zero() {
        assert_eq!(monthly_limit_from_metadata(None), 0);
        assert_eq!(monthly_limit_from_metadata(Some(&"plenty".to_string())), 0);
    }

    #[test]
    fn catalog_resolves_known_prices() {
        let catalog = PlanCatalog::new(vec![plan("price_pro", 150), plan("price_max", -1)]);
        assert_eq!(catalog.limit_for_price("price_pro"), 150);
        assert_eq!(catalog.limit_for_price("price_max"), -1);
    }

    #[test]
    fn catalog_falls_back_for_unknown_prices() {
        let catalog = PlanCatalog::new(vec![plan("price_pro", 150)]);
        assert_eq!(catalog.limit_for_price("price_retired"), 0);
    }
}
