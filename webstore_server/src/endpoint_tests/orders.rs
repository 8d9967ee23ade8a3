use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use webstore_engine::{events::EventProducers, AccountApi, AuthApi, OrderFlowApi, ORDER_WINDOW};

use super::{
    helpers::{send_request, test_order, test_user, with_admin_key, with_bearer},
    mocks::MockBackend,
};
use crate::routes::{CooldownRoute, MyOrdersRoute, OrderByIdRoute, OrderCountRoute, OrdersSearchRoute};

fn order_routes(cfg: &mut ServiceConfig, auth: MockBackend, accounts: MockBackend) {
    let auth_api = AuthApi::new(auth);
    let orders_api = OrderFlowApi::new(accounts, EventProducers::default());
    cfg.service(MyOrdersRoute::<MockBackend>::new())
        .service(CooldownRoute::<MockBackend>::new())
        .service(OrderByIdRoute::<MockBackend>::new())
        .app_data(web::Data::new(auth_api))
        .app_data(web::Data::new(orders_api));
}

#[actix_web::test]
async fn my_orders_without_token_is_401() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/orders/my-orders");
    let (status, body) =
        send_request(req, |cfg| order_routes(cfg, MockBackend::new(), MockBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No Authorization header"), "unexpected body: {body}");
}

#[actix_web::test]
async fn unknown_token_is_401() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(None));
    let req = with_bearer(TestRequest::get().uri("/orders/my-orders"), "bogus");
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, MockBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Unknown access token"), "unexpected body: {body}");
}

#[actix_web::test]
async fn banned_account_is_403() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| {
        let mut user = test_user(1, "alice", 100);
        user.is_banned = true;
        Ok(Some(user))
    });
    let req = with_bearer(TestRequest::get().uri("/orders/my-orders"), "alice-token");
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, MockBackend::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("banned"), "unexpected body: {body}");
}

#[actix_web::test]
async fn my_orders_returns_orders_and_remaining_quota() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(Some(test_user(1, "alice", 100))));
    let mut accounts = MockBackend::new();
    accounts.expect_fetch_orders_for_user().returning(|_| Ok(vec![test_order(5, 1, 40)]));
    accounts.expect_fetch_order_timestamps_since().returning(|_, _| Ok(vec![Utc::now() - Duration::minutes(1)]));
    let req = with_bearer(TestRequest::get().uri("/orders/my-orders"), "alice-token");
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"remaining\":2"), "unexpected body: {body}");
    assert!(body.contains("\"id\":5"), "unexpected body: {body}");
}

#[actix_web::test]
async fn exhausted_cooldown_reports_next_slot() {
    let _ = env_logger::try_init();
    let oldest = Utc::now() - Duration::days(1);
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(Some(test_user(1, "alice", 100))));
    let mut accounts = MockBackend::new();
    accounts
        .expect_fetch_order_timestamps_since()
        .returning(move |_, _| Ok(vec![oldest, oldest + Duration::hours(2), oldest + Duration::hours(4)]));
    let req = with_bearer(TestRequest::get().uri("/orders/cooldown"), "alice-token");
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"remaining_orders\":0"), "unexpected body: {body}");
    let expected = (oldest + ORDER_WINDOW).timestamp();
    assert!(body.contains("next_available_at"), "unexpected body: {body}");
    // The hint is the oldest order's timestamp plus the window length.
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    let hint = parsed["next_available_at"].as_str().unwrap();
    assert_eq!(chrono::DateTime::parse_from_rfc3339(hint).unwrap().timestamp(), expected);
}

#[actix_web::test]
async fn querying_another_users_cooldown_requires_the_admin_key() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(Some(test_user(1, "alice", 100))));
    let req = with_bearer(TestRequest::get().uri("/orders/cooldown?email=bob%40example.com"), "alice-token");
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, MockBackend::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("admin"), "unexpected body: {body}");
}

#[actix_web::test]
async fn admin_can_query_another_users_cooldown() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(Some(test_user(1, "alice", 100))));
    let mut accounts = MockBackend::new();
    accounts
        .expect_fetch_user_account_for_email()
        .withf(|email| email == "bob@example.com")
        .returning(|_| Ok(Some(test_user(2, "bob", 50))));
    accounts
        .expect_fetch_order_timestamps_since()
        .withf(|user_id, _| *user_id == 2)
        .returning(|_, _| Ok(vec![]));
    let req = with_admin_key(with_bearer(
        TestRequest::get().uri("/orders/cooldown?email=bob%40example.com"),
        "alice-token",
    ));
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"remaining_orders\":3"), "unexpected body: {body}");
}

#[actix_web::test]
async fn foreign_orders_are_hidden_from_plain_callers() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(Some(test_user(1, "alice", 100))));
    let mut accounts = MockBackend::new();
    accounts.expect_fetch_order_by_id().returning(|_| Ok(Some(test_order(9, 99, 40))));
    let req = with_bearer(TestRequest::get().uri("/orders/9"), "alice-token");
    let (status, body) = send_request(req, |cfg| order_routes(cfg, auth, accounts)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Order 9"), "unexpected body: {body}");
}

#[actix_web::test]
async fn order_search_and_count_require_the_admin_key() {
    let _ = env_logger::try_init();
    fn admin_routes(cfg: &mut ServiceConfig, accounts: MockBackend) {
        let accounts_api = AccountApi::new(accounts);
        cfg.service(OrdersSearchRoute::<MockBackend>::new())
            .service(OrderCountRoute::<MockBackend>::new())
            .app_data(web::Data::new(accounts_api));
    }
    let req = TestRequest::get().uri("/orders");
    let (status, _) = send_request(req, |cfg| admin_routes(cfg, MockBackend::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut accounts = MockBackend::new();
    accounts.expect_count_orders_for_user().withf(|user_id| *user_id == 7).returning(|_| Ok(4));
    let req = with_admin_key(TestRequest::get().uri("/orders/user/7/count"));
    let (status, body) = send_request(req, |cfg| admin_routes(cfg, accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"count\":4"), "unexpected body: {body}");
}
