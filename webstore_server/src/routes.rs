//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use webstore_engine::{
    db_types::UserAccount,
    order_objects::OrderQueryFilter,
    AccountApi,
    AccountManagement,
    AuthApi,
    AuthManagement,
    LedgerManagement,
    OrderFlowApi,
    WebstoreDatabase,
};

use crate::{
    auth::{authenticated_user, is_admin, require_admin},
    config::ServerConfig,
    data_objects::{
        CooldownResponse,
        DeductRequest,
        DeleteOrdersRequest,
        EmailQuery,
        JsonResponse,
        NewOrderRequest,
        OrderCountResponse,
        StatusUpdateRequest,
        TopUpRequest,
        TransferRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
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

//----------------------------------------------   Orders  ----------------------------------------------------

route!(submit_order => Post "/orders" impl WebstoreDatabase);
/// Places a new order on behalf of the authenticated caller.
///
/// The body lists catalog service ids plus an optional note; the total is recomputed server-side from current
/// catalog prices, never taken from the client. Admission can fail with 400 (empty/unknown items, not enough
/// credits), or 429 with a `next_available_at` retry hint when the order quota for the sliding window is used up.
pub async fn submit_order<A: WebstoreDatabase>(
    req: HttpRequest,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    let order = body.into_inner();
    debug!("💻️ POST order for {} with {} items", user.username, order.items.len());
    let admitted = api.submit_order(&user, &order.items, order.note).await.map_err(|e| {
        if !e.is_business_rule() {
            error!("💻️ Order submission for {} failed: {e}", user.username);
        }
        e
    })?;
    Ok(HttpResponse::Created().json(admitted))
}

route!(my_orders => Get "/orders/my-orders" impl AccountManagement, AuthManagement);
/// The caller's orders, newest first, plus their remaining quota.
///
/// An `email` query parameter may name another account, but only together with the admin key.
pub async fn my_orders<A: AccountManagement + AuthManagement>(
    req: HttpRequest,
    query: web::Query<EmailQuery>,
    api: web::Data<OrderFlowApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    let target = resolve_target_user(&req, &query.into_inner(), &user, api.db(), &config).await?;
    debug!("💻️ GET my_orders for {}", target.username);
    let result = api.orders_for_user(target.id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(cooldown => Get "/orders/cooldown" impl AccountManagement, AuthManagement);
/// The caller's rate-window standing: how many orders they may still place, and when the next slot opens if the
/// quota is exhausted.
pub async fn cooldown<A: AccountManagement + AuthManagement>(
    req: HttpRequest,
    query: web::Query<EmailQuery>,
    api: web::Data<OrderFlowApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    let target = resolve_target_user(&req, &query.into_inner(), &user, api.db(), &config).await?;
    debug!("💻️ GET cooldown for {}", target.username);
    let status = api.cooldown_status(target.id).await?;
    let response =
        CooldownResponse { remaining_orders: status.remaining, next_available_at: status.next_available_at };
    Ok(HttpResponse::Ok().json(response))
}

/// Applies the optional `email` override: plain callers may only query themselves, the admin key unlocks any
/// account.
async fn resolve_target_user<B: AccountManagement>(
    req: &HttpRequest,
    query: &EmailQuery,
    caller: &UserAccount,
    db: &B,
    config: &ServerConfig,
) -> Result<UserAccount, ServerError> {
    match &query.email {
        None => Ok(caller.clone()),
        Some(email) if email == &caller.email => Ok(caller.clone()),
        Some(email) => {
            require_admin(req, config)?;
            db.fetch_user_account_for_email(email)
                .await?
                .ok_or_else(|| ServerError::NoRecordFound(format!("User with email {email}")))
        },
    }
}

route!(order_by_id => Get "/orders/{id}" impl AccountManagement, AuthManagement);
/// Fetches one order. Callers only ever see their own orders; other ids return 404 whether they exist or not.
/// The admin key unlocks any order.
pub async fn order_by_id<A: AccountManagement + AuthManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    debug!("💻️ GET order_by_id({order_id}) for {}", user.username);
    let order = api
        .db()
        .fetch_order_by_id(order_id)
        .await?
        .filter(|o| o.user_id == user.id || is_admin(&req, &config))
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_search => Get "/orders" impl AccountManagement, LedgerManagement);
/// Admin listing of all orders, optionally filtered by user, email, status or time range.
pub async fn orders_search<A: AccountManagement + LedgerManagement>(
    req: HttpRequest,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<AccountApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    require_admin(&req, &config)?;
    let query = query.into_inner();
    debug!("💻️ GET orders search");
    let orders = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Put "/orders/{id}/status" impl WebstoreDatabase);
/// Admin status transition. Cancelling a non-terminal order refunds it; cancelling twice is a no-op; illegal
/// transitions and same-status requests yield 409.
pub async fn update_order_status<A: WebstoreDatabase>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    require_admin(&req, &config)?;
    let order_id = path.into_inner();
    let new_status = body.into_inner().status;
    debug!("💻️ PUT order {order_id} status -> {new_status}");
    let order = api.update_order_status(order_id, new_status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/orders/{id}" impl WebstoreDatabase);
/// Admin record purge of one order. No refund is issued; cancellation is the route for that.
pub async fn delete_order<A: WebstoreDatabase>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    require_admin(&req, &config)?;
    let order_id = path.into_inner();
    debug!("💻️ DELETE order {order_id}");
    if api.db().delete_order(order_id).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {order_id} deleted"))))
    } else {
        Err(ServerError::NoRecordFound(format!("Order {order_id}")))
    }
}

route!(delete_orders_for_user => Delete "/orders/by-user/{user_id}" impl WebstoreDatabase);
/// Admin record purge of all of a user's orders. No refunds.
pub async fn delete_orders_for_user<A: WebstoreDatabase>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    require_admin(&req, &config)?;
    let user_id = path.into_inner();
    let count = api.db().delete_orders_for_user(user_id).await?;
    debug!("💻️ DELETE orders for user {user_id}: {count} removed");
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Deleted {count} orders"))))
}

route!(delete_orders_by_ids => Delete "/orders/by-ids" impl WebstoreDatabase);
/// Admin record purge of a batch of orders. No refunds.
pub async fn delete_orders_by_ids<A: WebstoreDatabase>(
    req: HttpRequest,
    body: web::Json<DeleteOrdersRequest>,
    api: web::Data<OrderFlowApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    require_admin(&req, &config)?;
    let ids = body.into_inner().ids;
    let count = api.db().delete_orders_by_ids(&ids).await?;
    debug!("💻️ DELETE orders by id: {count} of {} removed", ids.len());
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Deleted {count} orders"))))
}

route!(order_count => Get "/orders/user/{user_id}/count" impl AccountManagement, LedgerManagement);
/// Admin utility: how many orders a user has placed, all time.
pub async fn order_count<A: AccountManagement + LedgerManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<AccountApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    require_admin(&req, &config)?;
    let user_id = path.into_inner();
    debug!("💻️ GET order count for user {user_id}");
    let count = api.count_orders_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(OrderCountResponse { user_id, count }))
}

//----------------------------------------------   Credits  ----------------------------------------------------

route!(top_up => Post "/credits/topup" impl AccountManagement, LedgerManagement, AuthManagement);
/// Adds credits to an account and returns the new balance. Callers top up their own account; naming another
/// `user_id` requires the admin key.
pub async fn top_up<A: AccountManagement + LedgerManagement + AuthManagement>(
    req: HttpRequest,
    body: web::Json<TopUpRequest>,
    api: web::Data<AccountApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    let request = body.into_inner();
    let target = match request.user_id {
        Some(id) if id != user.id => {
            require_admin(&req, &config)?;
            id
        },
        _ => user.id,
    };
    debug!("💻️ POST top up of {} for user #{target}", request.amount);
    let balance = api.top_up(target, request.amount).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user_id": target, "balance": balance })))
}

route!(deduct => Post "/credits/deduct" impl AccountManagement, LedgerManagement, AuthManagement);
/// Removes credits from the caller's own account and returns the new balance.
pub async fn deduct<A: AccountManagement + LedgerManagement + AuthManagement>(
    req: HttpRequest,
    body: web::Json<DeductRequest>,
    api: web::Data<AccountApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    let request = body.into_inner();
    debug!("💻️ POST deduction of {} for {}", request.amount, user.username);
    let balance = api.deduct(user.id, request.amount).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user_id": user.id, "balance": balance })))
}

route!(transfer => Post "/credits/transfer" impl AccountManagement, LedgerManagement, AuthManagement);
/// Moves credits from the caller to another user, looked up by username.
pub async fn transfer<A: AccountManagement + LedgerManagement + AuthManagement>(
    req: HttpRequest,
    body: web::Json<TransferRequest>,
    api: web::Data<AccountApi<A>>,
    auth_api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    let request = body.into_inner();
    debug!("💻️ POST transfer of {} from {} to {}", request.amount, user.username, request.to_username);
    let outcome = api.transfer(user.id, &request.to_username, request.amount).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

//----------------------------------------------   Users  ----------------------------------------------------

route!(user_info => Get "/users/userinfo" impl AuthManagement);
/// The caller's own account record, current balance included.
pub async fn user_info<A: AuthManagement>(
    req: HttpRequest,
    auth_api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let user = authenticated_user(&req, auth_api.as_ref()).await?;
    debug!("💻️ GET userinfo for {}", user.username);
    Ok(HttpResponse::Ok().json(user))
}
