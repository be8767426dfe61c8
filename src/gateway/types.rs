//! Gateway types — wire rows, write payloads, and the data-gateway trait.
//!
//! DESIGN
//! ======
//! Row structs mirror the remote tables (`students`, `courses`,
//! `student_courses`) plus the embedded shape the row API returns for joined
//! selects. Write payloads are separate structs so inserts never carry
//! server-generated columns. `DataGateway` is the narrow async seam the
//! roster store talks through; tests swap in an in-memory fake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by data-gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    MissingConfig { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The HTTP round trip to the row API failed.
    #[error("API request failed: {0}")]
    Request(String),

    /// The row API rejected the call. Displays as the server's own message
    /// so store error state carries the reason the server gave.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The row API response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// STUDENT ROWS
// =============================================================================

/// Enrollment state shown in the roster. Stored lowercase on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

/// A bare `students` row as returned from writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: Uuid,
    pub student_name: String,
    pub cohort: String,
    pub status: StudentStatus,
    pub date_joined: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// A `students` row with its enrollments embedded, as returned by the
/// joined list select. `student_courses` defaults to empty because the
/// embed is absent for students with no enrollments on some row APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: Uuid,
    pub student_name: String,
    pub cohort: String,
    pub status: StudentStatus,
    pub date_joined: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    #[serde(default)]
    pub student_courses: Vec<EnrollmentRecord>,
}

/// One embedded enrollment inside a [`StudentRecord`]. The field is named
/// `courses` to match the wire shape: the row API nests the joined course
/// row under its table name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: Uuid,
    pub course_id: Uuid,
    pub courses: CourseRow,
}

// =============================================================================
// COURSE + ENROLLMENT ROWS
// =============================================================================

/// A `courses` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    pub id: Uuid,
    pub course_name: String,
    pub course_code: String,
}

/// A bare `student_courses` join row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
}

// =============================================================================
// WRITE PAYLOADS
// =============================================================================

/// Insert payload for `students`. The server generates `id`.
#[derive(Debug, Clone, Serialize)]
pub struct StudentInsert {
    pub student_name: String,
    pub cohort: String,
    pub status: StudentStatus,
    pub date_joined: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Update payload for `students`. `date_joined` is immutable after insert
/// and deliberately absent here.
#[derive(Debug, Clone, Serialize)]
pub struct StudentPatch {
    pub student_name: String,
    pub cohort: String,
    pub status: StudentStatus,
    pub last_login: DateTime<Utc>,
}

/// Insert payload for `courses`.
#[derive(Debug, Clone, Serialize)]
pub struct CourseInsert {
    pub course_name: String,
    pub course_code: String,
}

/// Insert payload for `student_courses`.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentInsert {
    pub student_id: Uuid,
    pub course_id: Uuid,
}

// =============================================================================
// DATA GATEWAY TRAIT
// =============================================================================

/// Narrow async seam over the remote row API. Enables mocking in tests.
///
/// Every method maps to one HTTP round trip; multi-row workflows (insert a
/// student plus its enrollments) are composed by the roster store, not here.
#[async_trait::async_trait]
pub trait DataGateway: Send + Sync {
    /// Fetch all students in `cohort`, ordered by name, with enrollments
    /// and course details embedded.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails, the server rejects
    /// it, or the response is malformed.
    async fn list_students(&self, cohort: &str) -> Result<Vec<StudentRecord>, GatewayError>;

    /// Insert one student and return the created row.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the server rejects it.
    async fn insert_student(&self, row: &StudentInsert) -> Result<StudentRow, GatewayError>;

    /// Patch the student with `id` and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the server rejects it.
    async fn update_student(&self, id: Uuid, patch: &StudentPatch) -> Result<StudentRow, GatewayError>;

    /// Delete the student with `id`. Enrollment cleanup is a separate call.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the server rejects it.
    async fn delete_student(&self, id: Uuid) -> Result<(), GatewayError>;

    /// Fetch the full course catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the response is malformed.
    async fn list_courses(&self) -> Result<Vec<CourseRow>, GatewayError>;

    /// Look up a course by exact display name.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the response is malformed.
    async fn find_course_by_name(&self, name: &str) -> Result<Option<CourseRow>, GatewayError>;

    /// Insert one course and return the created row.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the server rejects it.
    async fn insert_course(&self, row: &CourseInsert) -> Result<CourseRow, GatewayError>;

    /// Insert one enrollment join row and return it.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the server rejects it.
    async fn insert_enrollment(&self, row: &EnrollmentInsert) -> Result<EnrollmentRow, GatewayError>;

    /// Delete every enrollment row for `student_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails or the server rejects it.
    async fn delete_enrollments_for_student(&self, student_id: Uuid) -> Result<(), GatewayError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
