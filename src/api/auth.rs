// ### OAuth Endpoints

use reqwest::{Method, Url};

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::AuthResponse;

const OAUTH_PATH: &str = "/users/auth/google_oauth2";

/// `code`/`state` pair handed back by the provider redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

impl CallbackParams {
    /// Accepts either the full redirected URL or just its query string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(_) => Url::parse(&format!(
                "http://localhost/?{}",
                input.trim_start_matches('?')
            ))?,
        };

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" if !value.is_empty() => code = Some(value.into_owned()),
                "state" if !value.is_empty() => state = Some(value.into_owned()),
                _ => {}
            }
        }

        match (code, state) {
            (Some(code), Some(state)) => Ok(Self { code, state }),
            _ => Err(ApiError::Authentication {
                message: "Missing required parameters".to_string(),
            }),
        }
    }
}

impl ApiClient {
    /// Where the browser has to go to start the Google login
    pub fn login_url(&self) -> Result<Url> {
        self.url(OAUTH_PATH)
    }

    /// Trade the redirect parameters for a bearer token and the user profile
    ///
    /// GET /users/auth/google_oauth2/callback?code={code}&state={state}
    pub async fn exchange_code(&self, params: &CallbackParams) -> Result<AuthResponse> {
        let builder = self
            .request(Method::GET, &format!("{OAUTH_PATH}/callback"))?
            .query(&[("code", params.code.as_str()), ("state", params.state.as_str())]);
        self.send_json(builder).await.map_err(|err| match err {
            ApiError::Unauthorized | ApiError::Api { .. } => ApiError::Authentication {
                message: err.to_string(),
            },
            other => other,
        })
    }
}
