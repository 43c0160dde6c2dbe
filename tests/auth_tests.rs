mod common;

use axo_tasks::api::CallbackParams;
use axo_tasks::{ApiClient, ApiError};
use common::{mock_token, setup_mock_server, user_json};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_login_url_points_at_provider() {
    let client = assert_ok!(ApiClient::new("http://localhost:3000"));
    let url = assert_ok!(client.login_url());
    assert_eq!(url.as_str(), "http://localhost:3000/users/auth/google_oauth2");
}

#[tokio::test]
async fn test_exchange_code_returns_token_and_user() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/users/auth/google_oauth2/callback"))
        .and(query_param("code", "abc"))
        .and(query_param("state", "xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": mock_token(),
            "user": user_json(0)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = assert_ok!(ApiClient::new(&server.uri()));
    let params = assert_ok!(CallbackParams::parse(
        "http://localhost:3001/auth/callback?code=abc&state=xyz"
    ));
    let auth = assert_ok!(client.exchange_code(&params).await);
    assert_eq!(auth.token, mock_token());
    assert_eq!(auth.user.email, "ana@example.com");
}

#[tokio::test]
async fn test_rejected_code_is_authentication_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/users/auth/google_oauth2/callback"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "error": "bad state" })))
        .mount(&server)
        .await;

    let client = assert_ok!(ApiClient::new(&server.uri()));
    let params = CallbackParams {
        code: "abc".to_string(),
        state: "forged".to_string(),
    };
    let err = client.exchange_code(&params).await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));
}

#[test]
fn test_missing_code_is_rejected() {
    let err = CallbackParams::parse("state=xyz").unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));
}
