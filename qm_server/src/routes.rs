//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage traits so that the endpoint tests can substitute mocks. Since
//! actix-web cannot handle generics in handlers directly, registration is implemented manually using the
//! `route!` macro.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use qm_engine::{
    catalog_objects::ProductQueryFilter,
    db_types::{NewProduct, ProductUpdate, Role},
    traits::{AuthManagement, CatalogManagement, OrderManagement, UserManagement},
    AccountApi,
    AuthApi,
    CatalogApi,
    OrdersApi,
    RegisterUser,
};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    data_objects::{
        AuthResponse,
        ForgotPasswordRequest,
        JsonResponse,
        LoginRequest,
        ResetPasswordRequest,
        SignupRequest,
        UpdateMeRequest,
        UpdatePasswordRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $bounds:ident where requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $bounds + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------

route!(signup => Post "/auth/signup" impl UserManagement);
/// Route handler for the signup endpoint
///
/// Creates a new account (hashing the supplied password) and immediately issues an access token, so a fresh
/// signup is also logged in.
pub async fn signup<B: UserManagement>(
    body: web::Json<SignupRequest>,
    api: web::Data<AccountApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST signup for {}", request.email);
    let registration = RegisterUser {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        password: request.password,
    };
    let user = api.register_user(registration).await?;
    let token = signer.issue_token(&user)?;
    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

route!(login => Post "/auth/login" impl AuthManagement);
/// Route handler for the login endpoint
///
/// Checks the email + password pair against the stored credentials and issues a JWT access token. The token
/// is valid for a relatively short period and will NOT refresh.
pub async fn login<B: AuthManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST login for {}", request.email);
    let user = api.verify_credentials(&request.email, &request.password).await?;
    let token = signer.issue_token(&user)?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

route!(forgot_password => Post "/auth/forgot-password" impl AuthManagement);
/// Route handler for the forgot-password endpoint
///
/// Issues a short-lived reset token. Delivery is an external concern (a mailer would pick it up); the token is
/// written to the server log. The response does not reveal whether the email exists.
pub async fn forgot_password<B: AuthManagement>(
    body: web::Json<ForgotPasswordRequest>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST forgot-password");
    if let Some(token) = api.issue_reset_token(&request.email).await? {
        // Stand-in for the mailer: operators can pull the token from the log
        info!("🔑️ Password reset token issued (deliver out of band): {token}");
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("If that email exists, a reset token has been sent")))
}

route!(reset_password => Post "/auth/reset-password/{token}" impl AuthManagement);
/// Route handler for the reset-password endpoint
///
/// Redeems a reset token and stores the new password. On success the user is logged in immediately.
pub async fn reset_password<B: AuthManagement>(
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let token = path.into_inner();
    debug!("💻️ POST reset-password");
    let user = api.reset_password(&token, &body.into_inner().password).await?;
    let token = signer.issue_token(&user)?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

route!(update_password => Patch "/auth/password" impl AuthManagement);
/// Route handler for the password update endpoint
///
/// Authenticated users change their password here; profile updates via `/users/me` deliberately reject
/// password fields.
pub async fn update_password<B: AuthManagement>(
    claims: JwtClaims,
    body: web::Json<UpdatePasswordRequest>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PATCH password for user #{}", claims.user_id());
    let request = body.into_inner();
    api.update_password(claims.user_id(), &request.current_password, &request.password).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Password updated")))
}

//----------------------------------------------   Users  ----------------------------------------------------

route!(my_account => Get "/users/me" impl UserManagement);
/// Route handler for the current user's profile. The account is resolved from the access token.
pub async fn my_account<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_account for user #{}", claims.user_id());
    let user = api.fetch_user(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(update_me => Patch "/users/me" impl UserManagement);
pub async fn update_me<B: UserManagement>(
    claims: JwtClaims,
    body: web::Json<UpdateMeRequest>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PATCH my_account for user #{}", claims.user_id());
    let request = body.into_inner();
    if request.contains_password_fields() {
        return Err(ServerError::ValidationError(
            "This route is not for changing passwords. Please use the password update endpoint".to_string(),
        ));
    }
    let user = api.update_user(claims.user_id(), request.into_update()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(delete_me => Delete "/users/me" impl UserManagement);
/// Deactivates the account rather than deleting it; orders keep referencing it.
pub async fn delete_me<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ DELETE my_account for user #{}", claims.user_id());
    api.deactivate_user(claims.user_id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

route!(users => Get "/users" impl UserManagement where requires [Role::Admin]);
/// Route handler for the user listing. Admins only.
pub async fn users<B: UserManagement>(api: web::Data<AccountApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET users");
    let users = api.fetch_all_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

route!(user_by_id => Get "/users/{id}" impl UserManagement where requires [Role::Admin]);
pub async fn user_by_id<B: UserManagement>(
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET user {id}");
    let user = api.fetch_user(id).await?;
    Ok(HttpResponse::Ok().json(user))
}

//----------------------------------------------   Products  ----------------------------------------------------

route!(products => Get "/products" impl CatalogManagement);
/// Route handler for the catalog listing
///
/// Supports filtering (category, price range, name substring) and limit/offset pagination via query
/// parameters. Open to unauthenticated callers: it's a storefront.
pub async fn products<B: CatalogManagement>(
    query: web::Query<ProductQueryFilter>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ GET products search for [{query}]");
    let products = api.search_products(query).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
pub async fn product_by_id<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET product {id}");
    let product = api.fetch_product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement where requires [Role::Admin]);
pub async fn create_product<B: CatalogManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST product [{}]", product.name);
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Patch "/products/{id}" impl CatalogManagement where requires [Role::Admin]);
pub async fn update_product<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PATCH product {id}");
    let product = api.update_product(id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl CatalogManagement where requires [Role::Admin]);
pub async fn delete_product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE product {id}");
    api.delete_product(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(my_orders => Get "/orders/my" impl OrderManagement);
/// Route handler for the current user's orders
///
/// Authenticated users fetch their own orders here; the account is taken from the access token. Admins can
/// fetch anyone's orders through `/orders` and `/orders/{id}`.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for user #{}", claims.user_id());
    let orders = api.fetch_orders_for_user(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(orders => Get "/orders" impl OrderManagement where requires [Role::Admin]);
pub async fn orders<B: OrderManagement>(api: web::Data<OrdersApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders");
    let orders = api.fetch_all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement where requires [Role::Admin]);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order {id}");
    let order = api.fetch_order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/orders/{id}" impl OrderManagement where requires [Role::Admin]);
pub async fn delete_order<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE order {id}");
    api.delete_order(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
