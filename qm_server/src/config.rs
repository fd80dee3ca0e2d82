use std::env;

use chrono::Duration;
use log::*;
use qm_common::Secret;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use stripe_tools::StripeConfig;

const DEFAULT_QM_HOST: &str = "127.0.0.1";
const DEFAULT_QM_PORT: u16 = 3000;
const DEFAULT_JWT_VALIDITY: Duration = Duration::hours(24);
const DEFAULT_SUCCESS_URL: &str = "http://localhost:5173/my-orders";
const DEFAULT_CANCEL_URL: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Stripe API credentials and webhook secret.
    pub stripe: StripeConfig,
    /// When false, the webhook signature middleware lets every request through. Testing only.
    pub stripe_signature_checks: bool,
    pub checkout: CheckoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_QM_HOST.to_string(),
            port: DEFAULT_QM_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            stripe: StripeConfig::default(),
            stripe_signature_checks: true,
            checkout: CheckoutConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("QM_HOST").ok().unwrap_or_else(|| DEFAULT_QM_HOST.into());
        let port = env::var("QM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for QM_PORT. {e} Using the default, {DEFAULT_QM_PORT}, instead.");
                    DEFAULT_QM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_QM_PORT);
        let database_url = env::var("QM_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ QM_DATABASE_URL is not set. Please set it to the URL for the QuickMart database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let stripe = StripeConfig::new_from_env_or_default();
        let stripe_signature_checks =
            env::var("QM_STRIPE_SIGNATURE_CHECKS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
        if !stripe_signature_checks {
            warn!("🚨️ Webhook signature checks are DISABLED. Do not run production like this.");
        }
        let checkout = CheckoutConfig::from_env_or_default();
        Self { host, port, database_url, auth, stripe, stripe_signature_checks, checkout }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign (HS256) and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long issued access tokens stay valid.
    pub jwt_validity: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. Every \
             restart will invalidate all outstanding sessions. Set QM_JWT_SECRET for production use. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), jwt_validity: DEFAULT_JWT_VALIDITY }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, env::VarError> {
        let secret = env::var("QM_JWT_SECRET")?;
        let jwt_validity = env::var("QM_JWT_VALIDITY_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ QM_JWT_VALIDITY_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_JWT_VALIDITY.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for QM_JWT_VALIDITY_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_JWT_VALIDITY);
        Ok(Self { jwt_secret: Secret::new(secret), jwt_validity })
    }
}

//----------------------------------------------  CheckoutConfig  ------------------------------------------------------
/// Redirect targets attached to every checkout session.
#[derive(Clone, Debug)]
pub struct CheckoutConfig {
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self { success_url: DEFAULT_SUCCESS_URL.to_string(), cancel_url: DEFAULT_CANCEL_URL.to_string() }
    }
}

impl CheckoutConfig {
    pub fn from_env_or_default() -> Self {
        let success_url = env::var("QM_CHECKOUT_SUCCESS_URL").unwrap_or_else(|_| {
            info!("🪛️ QM_CHECKOUT_SUCCESS_URL is not set. Using the default, {DEFAULT_SUCCESS_URL}.");
            DEFAULT_SUCCESS_URL.to_string()
        });
        let cancel_url = env::var("QM_CHECKOUT_CANCEL_URL").unwrap_or_else(|_| {
            info!("🪛️ QM_CHECKOUT_CANCEL_URL is not set. Using the default, {DEFAULT_CANCEL_URL}.");
            DEFAULT_CANCEL_URL.to_string()
        });
        Self { success_url, cancel_url }
    }
}
