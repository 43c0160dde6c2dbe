// ### User Endpoints

use reqwest::Method;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::User;

impl ApiClient {
    /// Everyone a task can be assigned to
    ///
    /// GET /users
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let builder = self.request(Method::GET, "/users")?;
        self.send_json(builder).await
    }

    /// The logged-in user, including the authoritative coin balance
    ///
    /// GET /users/me
    pub async fn current_user(&self) -> Result<User> {
        let builder = self.request(Method::GET, "/users/me")?;
        self.send_json(builder).await
    }
}
