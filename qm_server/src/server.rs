use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::{error, info};
use qm_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    AuthApi,
    CatalogApi,
    OrderFlowApi,
    OrdersApi,
    SqliteDatabase,
};
use stripe_tools::{webhook, StripeApi};

use crate::{
    auth::{decoding_key, TokenIssuer},
    checkout_routes::{CheckoutSessionRoute, StripeWebhookRoute},
    config::ServerConfig,
    errors::ServerError,
    middleware::{JwtMiddlewareFactory, SignatureMiddlewareFactory},
    routes::{
        health,
        CreateProductRoute,
        DeleteMeRoute,
        DeleteOrderRoute,
        DeleteProductRoute,
        ForgotPasswordRoute,
        LoginRoute,
        MyAccountRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        OrdersRoute,
        ProductByIdRoute,
        ProductsRoute,
        ResetPasswordRoute,
        SignupRoute,
        UpdateMeRoute,
        UpdatePasswordRoute,
        UpdateProductRoute,
        UserByIdRoute,
        UsersRoute,
    },
};

pub const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    SqliteDatabase::create_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = default_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The default event wiring: a log-based monitoring sink. Deployments that want reconciliation failures on a
/// pager can hook their own handlers in before calling [`create_server_instance`].
pub fn default_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|ev| {
        Box::pin(async move {
            info!("📬️ Order #{} paid ({}).", ev.order.id, ev.order.total_price);
        })
    });
    hooks.on_reconciliation_failed(|ev| {
        Box::pin(async move {
            // The payment was captured but no order exists. This line is the minimum monitoring surface.
            error!("📬️ Reconciliation failed for payment session [{}]: {}", ev.session_id, ev.reason);
        })
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let stripe_api = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let auth_config = config.auth.clone();
    let checkout_config = config.checkout.clone();
    let webhook_secret = config.stripe.webhook_secret.clone();
    let signature_checks = config.stripe_signature_checks;
    let srv = HttpServer::new(move || {
        let catalog_api = CatalogApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let orders_api = OrdersApi::new(db.clone());
        let order_flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let jwt_signer = TokenIssuer::new(&auth_config);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("qm::access_log"))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(stripe_api.clone()))
            .app_data(web::Data::new(checkout_config.clone()));
        // Routes that require authentication
        let api_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(decoding_key(&auth_config)))
            .service(MyAccountRoute::<SqliteDatabase>::new())
            .service(UpdateMeRoute::<SqliteDatabase>::new())
            .service(DeleteMeRoute::<SqliteDatabase>::new())
            .service(UpdatePasswordRoute::<SqliteDatabase>::new())
            .service(UsersRoute::<SqliteDatabase>::new())
            .service(UserByIdRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(DeleteOrderRoute::<SqliteDatabase>::new())
            .service(CheckoutSessionRoute::<SqliteDatabase>::new());
        // The webhook reads the raw body for byte-exact signature verification before anything parses it
        let stripe_scope = web::scope("/stripe")
            .wrap(SignatureMiddlewareFactory::new(
                webhook::SIGNATURE_HEADER,
                webhook_secret.clone(),
                signature_checks,
            ))
            .service(StripeWebhookRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(SignupRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(ForgotPasswordRoute::<SqliteDatabase>::new())
            .service(ResetPasswordRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(api_scope)
            .service(stripe_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
