use log::*;
use qm_common::Secret;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
        }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_base = std::env::var("QM_STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string());
        let secret_key = Secret::new(std::env::var("QM_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("QM_STRIPE_SECRET_KEY not set. Checkout session creation will be rejected by Stripe.");
            "sk_test_00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("QM_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("QM_STRIPE_WEBHOOK_SECRET not set. Incoming webhook signatures cannot be verified.");
            "whsec_00000000000000".to_string()
        }));
        Self { api_base, secret_key, webhook_secret }
    }
}
