//! REST data gateway — row API client for students, courses, enrollments.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper over a hosted row API that exposes each table at
//! `{base}/rest/v1/{table}`, takes column filters in the query string
//! (`cohort=eq.AY 2024-25`) and join embeds in the `select` parameter, and
//! returns JSON arrays of rows. Writes send `Prefer: return=representation`
//! so every mutation hands back the affected rows. The service key travels
//! twice per request, as an `apikey` header and as a bearer token, which is
//! what the hosted API expects. Pure helpers (`eq_filter`, `error_message`)
//! keep the request grammar and error extraction testable without a server.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use super::types::{
    CourseInsert, CourseRow, DataGateway, EnrollmentInsert, EnrollmentRow, GatewayError, StudentInsert, StudentPatch,
    StudentRecord, StudentRow,
};

const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Embed clause for the joined student list: each student row carries its
/// enrollment rows, each enrollment its course row.
const STUDENT_SELECT: &str = "*,student_courses(id,course_id,courses(id,course_name,course_code))";

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug)]
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    /// Build a gateway against `base_url`, authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), api_key: api_key.to_string() })
    }

    /// Build a gateway from environment variables.
    ///
    /// Required:
    /// - `DATA_API_URL`: row API base URL (without the `/rest/v1` suffix)
    /// - `DATA_API_KEY`: service key sent with every request
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingConfig`] naming the absent variable, or
    /// [`GatewayError::ClientBuild`] if the HTTP client fails to build.
    pub fn from_env() -> Result<Self, GatewayError> {
        let base_url =
            std::env::var("DATA_API_URL").map_err(|_| GatewayError::MissingConfig { var: "DATA_API_URL".into() })?;
        let api_key =
            std::env::var("DATA_API_KEY").map_err(|_| GatewayError::MissingConfig { var: "DATA_API_KEY".into() })?;
        Self::new(&base_url, &api_key)
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, table_url(&self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select<T>(&self, table: &str, query: &[(&str, &str)]) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        rows_from(response).await
    }

    async fn insert_one<B, T>(&self, table: &str, row: &B) -> Result<T, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        let rows: Vec<T> = rows_from(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Parse("insert returned no rows".into()))
    }

    async fn update_where<B, T>(&self, table: &str, column: &str, value: &str, patch: &B) -> Result<Vec<T>, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let filter = eq_filter(value);
        let response = self
            .request(Method::PATCH, table)
            .query(&[(column, filter.as_str())])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        rows_from(response).await
    }

    async fn delete_where(&self, table: &str, column: &str, value: &str) -> Result<(), GatewayError> {
        let filter = eq_filter(value);
        let response = self
            .request(Method::DELETE, table)
            .query(&[(column, filter.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response
                .text()
                .await
                .map_err(|e| GatewayError::Request(e.to_string()))?;
            return Err(GatewayError::Api { status, message: error_message(status, &body) });
        }
        Ok(())
    }
}

// =============================================================================
// DATA GATEWAY IMPL
// =============================================================================

#[async_trait::async_trait]
impl DataGateway for RestGateway {
    async fn list_students(&self, cohort: &str) -> Result<Vec<StudentRecord>, GatewayError> {
        let filter = eq_filter(cohort);
        self.select(
            "students",
            &[("select", STUDENT_SELECT), ("cohort", filter.as_str()), ("order", "student_name.asc")],
        )
        .await
    }

    async fn insert_student(&self, row: &StudentInsert) -> Result<StudentRow, GatewayError> {
        self.insert_one("students", row).await
    }

    async fn update_student(&self, id: Uuid, patch: &StudentPatch) -> Result<StudentRow, GatewayError> {
        let rows: Vec<StudentRow> = self
            .update_where("students", "id", &id.to_string(), patch)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Parse("update returned no rows".into()))
    }

    async fn delete_student(&self, id: Uuid) -> Result<(), GatewayError> {
        self.delete_where("students", "id", &id.to_string()).await
    }

    async fn list_courses(&self) -> Result<Vec<CourseRow>, GatewayError> {
        self.select("courses", &[("select", "*")]).await
    }

    async fn find_course_by_name(&self, name: &str) -> Result<Option<CourseRow>, GatewayError> {
        let filter = eq_filter(name);
        let rows: Vec<CourseRow> = self
            .select("courses", &[("select", "*"), ("course_name", filter.as_str())])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_course(&self, row: &CourseInsert) -> Result<CourseRow, GatewayError> {
        self.insert_one("courses", row).await
    }

    async fn insert_enrollment(&self, row: &EnrollmentInsert) -> Result<EnrollmentRow, GatewayError> {
        self.insert_one("student_courses", row).await
    }

    async fn delete_enrollments_for_student(&self, student_id: Uuid) -> Result<(), GatewayError> {
        self.delete_where("student_courses", "student_id", &student_id.to_string())
            .await
    }
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

#[derive(Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn table_url(base_url: &str, table: &str) -> String {
    format!("{base_url}/rest/v1/{table}")
}

/// Render a value as the row API's equality filter (`eq.<value>`).
fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

/// Extract the server's `message` field from an error body, falling back to
/// a status-only description when the body is not the expected JSON object.
fn error_message(status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.message.is_empty() {
        format!("gateway error: status {status}")
    } else {
        parsed.message
    }
}

async fn rows_from<T>(response: reqwest::Response) -> Result<Vec<T>, GatewayError>
where
    T: DeserializeOwned,
{
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(GatewayError::Api { status, message: error_message(status, &text) });
    }

    serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
