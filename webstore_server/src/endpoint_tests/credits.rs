use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use webstore_engine::{AccountApi, AccountApiError, AuthApi, TransferOutcome};
use ws_common::Credits;

use super::{
    helpers::{send_request, test_user, with_admin_key, with_bearer},
    mocks::MockBackend,
};
use crate::routes::{DeductRoute, TopUpRoute, TransferRoute};

fn credit_routes(cfg: &mut ServiceConfig, auth: MockBackend, accounts: MockBackend) {
    let auth_api = AuthApi::new(auth);
    let accounts_api = AccountApi::new(accounts);
    cfg.service(TopUpRoute::<MockBackend>::new())
        .service(DeductRoute::<MockBackend>::new())
        .service(TransferRoute::<MockBackend>::new())
        .app_data(web::Data::new(auth_api))
        .app_data(web::Data::new(accounts_api));
}

fn authenticated_alice() -> MockBackend {
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token().returning(|_| Ok(Some(test_user(1, "alice", 100))));
    auth
}

#[actix_web::test]
async fn deduct_without_token_is_401() {
    let _ = env_logger::try_init();
    let req = TestRequest::post().uri("/credits/deduct").set_json(json!({ "amount": 10 }));
    let (status, _) = send_request(req, |cfg| credit_routes(cfg, MockBackend::new(), MockBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn top_up_credits_own_account_by_default() {
    let _ = env_logger::try_init();
    let mut accounts = MockBackend::new();
    accounts
        .expect_credit_account()
        .withf(|user_id, amount| *user_id == 1 && *amount == Credits::from(50))
        .returning(|_, _| Ok(Credits::from(150)));
    let req = with_bearer(TestRequest::post().uri("/credits/topup").set_json(json!({ "amount": 50 })), "t");
    let (status, body) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"balance\":150"), "unexpected body: {body}");
}

#[actix_web::test]
async fn topping_up_another_account_requires_the_admin_key() {
    let _ = env_logger::try_init();
    let req = with_bearer(
        TestRequest::post().uri("/credits/topup").set_json(json!({ "user_id": 2, "amount": 50 })),
        "t",
    );
    let (status, _) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), MockBackend::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut accounts = MockBackend::new();
    accounts
        .expect_credit_account()
        .withf(|user_id, _| *user_id == 2)
        .returning(|_, _| Ok(Credits::from(50)));
    let req = with_admin_key(with_bearer(
        TestRequest::post().uri("/credits/topup").set_json(json!({ "user_id": 2, "amount": 50 })),
        "t",
    ));
    let (status, body) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"user_id\":2"), "unexpected body: {body}");
}

#[actix_web::test]
async fn non_positive_amounts_are_rejected() {
    let _ = env_logger::try_init();
    let req = with_bearer(TestRequest::post().uri("/credits/topup").set_json(json!({ "amount": 0 })), "t");
    let (status, body) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), MockBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("strictly positive"), "unexpected body: {body}");
}

#[actix_web::test]
async fn overdrawing_deduction_is_rejected() {
    let _ = env_logger::try_init();
    let mut accounts = MockBackend::new();
    accounts.expect_debit_account().returning(|_, _| Err(AccountApiError::InsufficientFunds));
    let req = with_bearer(TestRequest::post().uri("/credits/deduct").set_json(json!({ "amount": 500 })), "t");
    let (status, body) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), accounts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Not enough credits"), "unexpected body: {body}");
}

#[actix_web::test]
async fn transfer_reports_the_new_sender_balance() {
    let _ = env_logger::try_init();
    let mut accounts = MockBackend::new();
    accounts
        .expect_transfer_credits()
        .withf(|from, to, amount| *from == 1 && to == "bob" && *amount == Credits::from(40))
        .returning(|_, _, _| {
            Ok(TransferOutcome {
                sender_id: 1,
                recipient_id: 2,
                recipient_username: "bob".to_string(),
                amount: Credits::from(40),
                sender_balance: Credits::from(60),
            })
        });
    let req = with_bearer(
        TestRequest::post().uri("/credits/transfer").set_json(json!({ "to_username": "bob", "amount": 40 })),
        "t",
    );
    let (status, body) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), accounts)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"sender_balance\":60"), "unexpected body: {body}");
}

#[actix_web::test]
async fn transfer_to_an_unknown_recipient_is_404() {
    let _ = env_logger::try_init();
    let mut accounts = MockBackend::new();
    accounts
        .expect_transfer_credits()
        .returning(|_, _, _| Err(AccountApiError::RecipientNotFound("ghost".to_string())));
    let req = with_bearer(
        TestRequest::post().uri("/credits/transfer").set_json(json!({ "to_username": "ghost", "amount": 40 })),
        "t",
    );
    let (status, body) = send_request(req, |cfg| credit_routes(cfg, authenticated_alice(), accounts)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("ghost"), "unexpected body: {body}");
}
