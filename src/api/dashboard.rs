// ### Dashboard Endpoints

use reqwest::Method;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{DashboardOverview, DetailedProject, UserSummary};

impl ApiClient {
    /// GET /dashboard/overview
    pub async fn dashboard_overview(&self) -> Result<DashboardOverview> {
        let builder = self.request(Method::GET, "/dashboard/overview")?;
        self.send_json(builder).await
    }

    /// GET /dashboard/detailed_projects
    pub async fn detailed_projects(&self) -> Result<Vec<DetailedProject>> {
        let builder = self.request(Method::GET, "/dashboard/detailed_projects")?;
        self.send_json(builder).await
    }

    /// GET /dashboard/users_summary
    pub async fn users_summary(&self) -> Result<Vec<UserSummary>> {
        let builder = self.request(Method::GET, "/dashboard/users_summary")?;
        self.send_json(builder).await
    }
}
