//----------------------------------------------   Checkout  ----------------------------------------------------

use actix_web::{web, HttpResponse};
use log::{debug, info, trace, warn};
use qm_engine::{
    traits::{CatalogManagement, CheckoutGatewayDatabase, CheckoutGatewayError},
    CatalogApi,
    OrderFlowApi,
};
use stripe_tools::{StripeApi, WebhookEvent};

use crate::{
    auth::JwtClaims,
    config::CheckoutConfig,
    data_objects::{CheckoutRequest, JsonResponse},
    errors::ServerError,
    integrations::stripe::{build_checkout_session, completed_checkout_from_event},
    route,
};

route!(checkout_session => Post "/checkout/session" impl CatalogManagement);
/// Route handler for checkout session creation
///
/// Turns the client's cart into priced line items (catalog prices only — nothing client-supplied), asks the
/// payment processor for a hosted session, and hands the processor's session object back to the client
/// unmodified. Nothing is persisted locally; the order record is created when the completion webhook is
/// reconciled.
pub async fn checkout_session<B: CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    catalog: web::Data<CatalogApi<B>>,
    stripe: web::Data<StripeApi>,
    checkout: web::Data<CheckoutConfig>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("🛍️️ POST checkout session for {} with {} cart items", claims.email, request.items.len());
    let session_request = build_checkout_session(&request.items, &claims, catalog.as_ref(), checkout.as_ref()).await?;
    let session = stripe.create_checkout_session(&session_request).await?;
    info!("🛍️️ Checkout session [{}] created for {}", session.id, claims.email);
    Ok(HttpResponse::Ok().json(session))
}

route!(stripe_webhook => Post "/webhook" impl CheckoutGatewayDatabase);
/// Route handler for the payment processor's webhook
///
/// The signature middleware has already verified the delivery against the raw body by the time this runs.
/// Responses must always be in the 200 range once the signature is good — anything else and the processor
/// retries the event indefinitely — so reconciliation failures are absorbed here (and published to the
/// failure hooks by the engine), never surfaced as errors.
pub async fn stripe_webhook<B>(body: web::Json<WebhookEvent>, api: web::Data<OrderFlowApi<B>>) -> HttpResponse
where B: CheckoutGatewayDatabase {
    let event = body.into_inner();
    trace!("🛍️️ Received webhook event [{}] of type {}", event.id, event.event_type);
    if !event.is_checkout_completed() {
        // Every other event type is acknowledged without action
        return HttpResponse::Ok().json(JsonResponse::success("Event acknowledged."));
    }
    let result = match completed_checkout_from_event(&event) {
        Err(e) => {
            warn!("🛍️️ Could not convert the completed session. {e}");
            JsonResponse::failure(e)
        },
        Ok(checkout) => match api.process_completed_checkout(checkout).await {
            Ok(Some(order)) => {
                info!("🛍️️ Order #{} created from session [{}].", order.id, order.payment_session_id);
                JsonResponse::success("Order processed successfully.")
            },
            Ok(None) => JsonResponse::success("Event acknowledged."),
            Err(CheckoutGatewayError::InvalidCartMetadata(e)) => {
                warn!("🛍️️ {e}");
                JsonResponse::failure(e)
            },
            Err(e) => {
                warn!("🛍️️ Unexpected error while handling payment completion. {e}");
                JsonResponse::failure("Unexpected error handling event.")
            },
        },
    };
    HttpResponse::Ok().json(result)
}
