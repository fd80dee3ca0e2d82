//! Conversions between the Stripe wire objects and the engine's domain types.
//!
//! Two boundaries live here, and they are the only places where minor-unit amounts are converted:
//! * cart → priced line items when building a checkout session (catalog prices out to cents), and
//! * completed-session event → [`CompletedCheckout`] when the webhook arrives (captured cents back in).

use log::trace;
use qm_common::{Price, CURRENCY_CODE_LOWER};
use qm_engine::{db_types::CartItem, helpers::cart, order_objects::CompletedCheckout, traits::CatalogManagement, CatalogApi};
use stripe_tools::{NewCheckoutSession, NewLineItem, WebhookEvent};
use thiserror::Error;

use crate::{auth::JwtClaims, config::CheckoutConfig, errors::ServerError};

#[derive(Debug, Error)]
pub enum CheckoutConversionError {
    #[error("The event payload was not a checkout session. {0}")]
    FormatError(String),
    #[error("The completed session carries no buyer email.")]
    MissingEmail,
    #[error("The completed session carries no captured amount.")]
    MissingAmount,
    #[error("The completed session carries no cart metadata.")]
    MissingCart,
}

/// Builds the payment processor request for a client-submitted cart.
///
/// Every product id is resolved against the catalog; a single unresolvable id fails the whole request (no
/// partial session). Unit amounts are the catalog prices in cents — nothing the client sent is used for
/// pricing. The original cart (ids and quantities only) is serialized into the session metadata so the
/// webhook can reconcile it later.
pub async fn build_checkout_session<B: CatalogManagement>(
    items: &[CartItem],
    claims: &JwtClaims,
    catalog: &CatalogApi<B>,
    checkout: &CheckoutConfig,
) -> Result<NewCheckoutSession, ServerError> {
    if items.is_empty() {
        return Err(ServerError::ValidationError("No products selected for checkout".to_string()));
    }
    let mut line_items = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(ServerError::ValidationError("Cart quantities must be at least 1".to_string()));
        }
        let product = catalog.fetch_product(item.product_id).await?;
        line_items.push(NewLineItem {
            name: product.name,
            description: product.description,
            unit_amount: product.price.cents(),
            quantity: item.quantity,
            currency: CURRENCY_CODE_LOWER.to_string(),
        });
    }
    Ok(NewCheckoutSession {
        line_items,
        customer_email: claims.email.clone(),
        client_reference_id: claims.user_id().to_string(),
        cart_metadata: cart::serialize_cart(items),
        success_url: checkout.success_url.clone(),
        cancel_url: checkout.cancel_url.clone(),
    })
}

/// Extracts the reconciler's input from a verified `checkout.session.completed` event.
pub fn completed_checkout_from_event(event: &WebhookEvent) -> Result<CompletedCheckout, CheckoutConversionError> {
    trace!("Converting webhook event [{}] into a completed checkout", event.id);
    let session = event.checkout_session().map_err(|e| CheckoutConversionError::FormatError(e.to_string()))?;
    let customer_email = session.buyer_email().ok_or(CheckoutConversionError::MissingEmail)?.to_string();
    let amount_total = session.amount_total.ok_or(CheckoutConversionError::MissingAmount)?;
    let cart_metadata = session.metadata.get("cart").cloned().ok_or(CheckoutConversionError::MissingCart)?;
    Ok(CompletedCheckout {
        session_id: session.id,
        customer_email,
        total_price: Price::from_cents(amount_total),
        cart_metadata,
    })
}
