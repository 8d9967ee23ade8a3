use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use webstore_engine::AuthApi;

use super::{
    helpers::{send_request, test_user, with_bearer},
    mocks::MockBackend,
};
use crate::routes::UserInfoRoute;

fn user_routes(cfg: &mut ServiceConfig, auth: MockBackend) {
    let auth_api = AuthApi::new(auth);
    cfg.service(UserInfoRoute::<MockBackend>::new()).app_data(web::Data::new(auth_api));
}

#[actix_web::test]
async fn userinfo_without_token_is_401() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/users/userinfo");
    let (status, _) = send_request(req, |cfg| user_routes(cfg, MockBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn userinfo_returns_the_callers_record() {
    let _ = env_logger::try_init();
    let mut auth = MockBackend::new();
    auth.expect_fetch_user_for_token()
        .withf(|token| token == "alice-token")
        .returning(|_| Ok(Some(test_user(1, "alice", 100))));
    let req = with_bearer(TestRequest::get().uri("/users/userinfo"), "alice-token");
    let (status, body) = send_request(req, |cfg| user_routes(cfg, auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"username\":\"alice\""), "unexpected body: {body}");
    assert!(body.contains("\"credits\":100"), "unexpected body: {body}");
}
