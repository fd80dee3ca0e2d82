use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// A request to create a hosted checkout session. Encoded into form parameters by [`crate::StripeApi`].
#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    pub line_items: Vec<NewLineItem>,
    /// The buyer's email, for correlating the completed session with a local user.
    pub customer_email: String,
    /// The buyer's local identifier, passed through as `client_reference_id`.
    pub client_reference_id: String,
    /// Serialized cart (product ids and quantities only), stored in `metadata[cart]` for reconciliation.
    pub cart_metadata: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor currency units (cents).
    pub unit_amount: i64,
    pub quantity: u32,
    pub currency: String,
}

/// The session object as returned by Stripe. Opaque to this system once created; it is returned to the
/// client unmodified and comes back (embedded in an event) on the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// The buyer email, preferring the email the session was created with.
    pub fn buyer_email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or_else(|| self.customer_details.as_ref().and_then(|d| d.email.as_deref()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// The envelope Stripe wraps every webhook delivery in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub object: Value,
}

impl WebhookEvent {
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_SESSION_COMPLETED
    }

    /// Deserializes the event payload as a checkout session object.
    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}
