use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Utc;
use log::debug;
use webstore_engine::db_types::{Order, OrderStatus, UserAccount};
use ws_common::{Credits, Secret};

use crate::config::ServerConfig;

pub const ADMIN_KEY: &str = "test-admin-key";

// A server configuration for tests. DO NOT re-use this admin key anywhere.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 4450,
        database_url: String::new(),
        admin_api_key: Some(Secret::new(ADMIN_KEY.to_string())),
        store_name: "The Webstore".to_string(),
    }
}

pub fn test_user(id: i64, username: &str, credits: i64) -> UserAccount {
    UserAccount {
        id,
        username: username.to_string(),
        name: format!("{username} surname"),
        email: format!("{username}@example.com"),
        contact_number: "000-0000".to_string(),
        address: "1 Test Lane".to_string(),
        credits: Credits::from(credits),
        is_banned: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_order(id: i64, user_id: i64, total: i64) -> Order {
    Order {
        id,
        user_id,
        username: "owner".to_string(),
        customer_name: "Owner Surname".to_string(),
        customer_email: "owner@example.com".to_string(),
        customer_address: "1 Test Lane".to_string(),
        note: None,
        total: Credits::from(total),
        status: OrderStatus::Pending,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        items: vec![],
    }
}

pub fn with_bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn with_admin_key(req: TestRequest) -> TestRequest {
    req.insert_header((crate::auth::ADMIN_AUTH_HEADER, ADMIN_KEY))
}

/// Builds an app from the given route/mock configuration and runs one request against it.
pub async fn send_request(
    req: TestRequest,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let app = App::new().app_data(web::Data::new(test_config())).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
