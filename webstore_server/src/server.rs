use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use webstore_engine::{
    events::{EventHandlers, EventHooks},
    AccountApi,
    AuthApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    mail::{notify_order_created, LogMailer},
    routes::{
        health,
        CooldownRoute,
        DeductRoute,
        DeleteOrderRoute,
        DeleteOrdersByIdsRoute,
        DeleteOrdersForUserRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        OrderCountRoute,
        OrdersSearchRoute,
        SubmitOrderRoute,
        TopUpRoute,
        TransferRoute,
        UpdateOrderStatusRoute,
        UserInfoRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let mut hooks = EventHooks::default();
    let store_name = config.store_name.clone();
    hooks.on_order_created(move |ev| {
        let store_name = store_name.clone();
        Box::pin(async move {
            notify_order_created(&LogMailer, &store_name, &ev.order);
        })
    });
    let handlers = EventHandlers::new(128, hooks);
    let producers = handlers.producers();
    tokio::spawn(handlers.start_handlers());

    // The order-flow API carries the per-user admission locks, so it (and its Data wrapper) must be created once
    // and shared across workers rather than rebuilt inside the app factory.
    let orders_api = web::Data::new(OrderFlowApi::new(db.clone(), producers));
    let accounts_api = web::Data::new(AccountApi::new(db.clone()));
    let auth_api = web::Data::new(AuthApi::new(db.clone()));
    let config_data = web::Data::new(config.clone());

    let srv = HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("wss::access_log"))
            .app_data(orders_api.clone())
            .app_data(accounts_api.clone())
            .app_data(auth_api.clone())
            .app_data(config_data.clone());
        // Literal segments must register ahead of `/orders/{id}` or the path parameter swallows them.
        let api_scope = web::scope("/api")
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(CooldownRoute::<SqliteDatabase>::new())
            .service(OrderCountRoute::<SqliteDatabase>::new())
            .service(DeleteOrdersForUserRoute::<SqliteDatabase>::new())
            .service(DeleteOrdersByIdsRoute::<SqliteDatabase>::new())
            .service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(DeleteOrderRoute::<SqliteDatabase>::new())
            .service(TopUpRoute::<SqliteDatabase>::new())
            .service(DeductRoute::<SqliteDatabase>::new())
            .service(TransferRoute::<SqliteDatabase>::new())
            .service(UserInfoRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
