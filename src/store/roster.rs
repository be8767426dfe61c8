//! Roster store — client-side state and multi-step writes for the student list.
//!
//! DESIGN
//! ======
//! The store owns one `RosterState` behind an async `RwLock`. UI code reads
//! cloned snapshots and calls the public operations; every mutation funnels
//! through those operations, so there is no ambient global state. Locks are
//! never held across gateway I/O: flip state, drop the lock, await the
//! round trip, re-lock to commit.
//!
//! Write operations are sagas: an ordered sequence of gateway calls that
//! aborts at the first failure with no compensating rollback. Rows already
//! written stay written, and the next successful refetch shows that partial
//! state.
//!
//! ERROR HANDLING
//! ==============
//! Gateway failures never escape as panics. Each operation records the
//! gateway's message in `error` and clears `loading`; write operations
//! additionally return the error so dialogs can surface it inline.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::gateway::types::{
    CourseInsert, CourseRow, DataGateway, EnrollmentInsert, GatewayError, StudentInsert, StudentPatch, StudentRecord,
    StudentRow, StudentStatus,
};

// =============================================================================
// FILTERS
// =============================================================================

/// Active roster filters. The year doubles as the cohort value sent to the
/// gateway; the class is carried for the UI and not part of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub year: String,
    pub class_name: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self { year: "AY 2024-25".into(), class_name: "CBSE 9".into() }
    }
}

/// Partial filter change; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub year: Option<String>,
    pub class_name: Option<String>,
}

// =============================================================================
// DRAFTS
// =============================================================================

/// Input for [`RosterStore::add_student`], as collected by the add dialog.
#[derive(Debug, Clone)]
pub struct StudentDraft {
    pub student_name: String,
    /// Cohort override; the active filter year applies when absent.
    pub cohort: Option<String>,
    pub status: StudentStatus,
    pub courses: Vec<CourseDraft>,
}

/// Input for [`RosterStore::update_student`].
#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub student_name: String,
    /// Cohort override; the active filter year applies when absent.
    pub cohort: Option<String>,
    pub status: StudentStatus,
    /// Full replacement course list; `None` leaves enrollments untouched.
    pub courses: Option<Vec<CourseDraft>>,
}

/// A course as requested in a draft, before it has a row identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub course_name: String,
    pub course_code: String,
}

impl CourseDraft {
    /// Build a draft from a display name, deriving the code from the final
    /// whitespace-separated token ("CBSE 9 Science" gives "Science").
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let code = name.split_whitespace().next_back().unwrap_or(name);
        Self { course_name: name.to_string(), course_code: code.to_string() }
    }
}

// =============================================================================
// STATE SNAPSHOT
// =============================================================================

/// Cloned state handed to UI code. `students` reflects the last fetch that
/// completed; `error` holds the message of the most recent failed operation.
#[derive(Debug, Clone, Default)]
pub struct RosterState {
    pub students: Vec<StudentRecord>,
    pub courses: Vec<CourseRow>,
    pub filters: Filters,
    pub loading: bool,
    pub error: Option<String>,
}

// =============================================================================
// STORE
// =============================================================================

pub struct RosterStore {
    gateway: Arc<dyn DataGateway>,
    state: RwLock<RosterState>,
    /// Serializes course resolve-or-create so two in-process writers cannot
    /// both miss the lookup and insert the same course name.
    course_resolve: Mutex<()>,
}

impl RosterStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway, state: RwLock::new(RosterState::default()), course_resolve: Mutex::new(()) }
    }

    /// Cloned state for rendering. Never waits on gateway I/O.
    pub async fn snapshot(&self) -> RosterState {
        self.state.read().await.clone()
    }

    /// Merge `update` into the filter state, then refetch the roster.
    ///
    /// No validation: a year that matches no cohort yields an empty list,
    /// not an error.
    pub async fn set_filters(&self, update: FilterUpdate) {
        {
            let mut state = self.state.write().await;
            if let Some(year) = update.year {
                state.filters.year = year;
            }
            if let Some(class_name) = update.class_name {
                state.filters.class_name = class_name;
            }
        }
        self.fetch_students().await;
    }

    /// Refresh the student list for the active filter year.
    ///
    /// Success replaces the cached list; failure records the gateway message
    /// and keeps the previous list. Overlapping calls race and the last
    /// response to resolve wins; there is no request-sequence guard.
    pub async fn fetch_students(&self) {
        let year = self.begin_operation().await;

        match self.gateway.list_students(&year).await {
            Ok(students) => {
                info!(%year, count = students.len(), "roster: students fetched");
                let mut state = self.state.write().await;
                state.students = students;
                state.loading = false;
            }
            Err(e) => {
                warn!(%year, error = %e, "roster: student fetch failed");
                self.record_failure(&e).await;
            }
        }
    }

    /// Load and cache the full course catalog, sorted by name. Independent
    /// of the roster filters.
    pub async fn fetch_courses(&self) {
        self.begin_operation().await;

        match self.gateway.list_courses().await {
            Ok(mut courses) => {
                courses.sort_by(|a, b| a.course_name.cmp(&b.course_name));
                info!(count = courses.len(), "roster: courses fetched");
                let mut state = self.state.write().await;
                state.courses = courses;
                state.loading = false;
            }
            Err(e) => {
                warn!(error = %e, "roster: course fetch failed");
                self.record_failure(&e).await;
            }
        }
    }

    /// Create a student with its course enrollments, then refetch.
    ///
    /// The student row is inserted first, stamped with the current time for
    /// both date-joined and last-login; the per-course resolve+link work
    /// then runs concurrently and must all complete before the refetch. The
    /// cohort comes from the draft when present, otherwise the active
    /// filter year.
    ///
    /// # Errors
    ///
    /// Returns the first [`GatewayError`] any step produced. The error is
    /// also recorded in state, and no refetch happens on failure.
    pub async fn add_student(&self, draft: StudentDraft) -> Result<StudentRow, GatewayError> {
        let year = self.begin_operation().await;
        let cohort = draft.cohort.clone().unwrap_or(year);

        match self.insert_student_with_courses(&draft, cohort).await {
            Ok(student) => {
                self.fetch_students().await;
                Ok(student)
            }
            Err(e) => {
                warn!(error = %e, "roster: add student failed");
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Update a student row and, when a course list is supplied, replace its
    /// enrollments wholesale, then refetch.
    ///
    /// # Errors
    ///
    /// Returns the first [`GatewayError`] any step produced. Same state
    /// contract as [`RosterStore::add_student`].
    pub async fn update_student(&self, student_id: Uuid, updates: StudentUpdate) -> Result<StudentRow, GatewayError> {
        let year = self.begin_operation().await;
        let cohort = updates.cohort.clone().unwrap_or(year);

        match self.apply_student_update(student_id, &updates, cohort).await {
            Ok(student) => {
                self.fetch_students().await;
                Ok(student)
            }
            Err(e) => {
                warn!(%student_id, error = %e, "roster: update student failed");
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Delete a student, clean up its enrollments, then refetch.
    ///
    /// The student row delete must succeed; enrollment cleanup is best
    /// effort. A cleanup failure leaves orphaned join rows that no joined
    /// select will surface, so it is logged rather than propagated.
    ///
    /// # Errors
    ///
    /// Returns the [`GatewayError`] from the student row delete.
    pub async fn delete_student(&self, student_id: Uuid) -> Result<(), GatewayError> {
        self.begin_operation().await;

        match self.gateway.delete_student(student_id).await {
            Ok(()) => {
                if let Err(e) = self.gateway.delete_enrollments_for_student(student_id).await {
                    warn!(%student_id, error = %e, "roster: enrollment cleanup failed");
                }
                info!(%student_id, "roster: student deleted");
                self.fetch_students().await;
                Ok(())
            }
            Err(e) => {
                warn!(%student_id, error = %e, "roster: delete student failed");
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    // =========================================================================
    // SAGA STEPS
    // =========================================================================

    async fn insert_student_with_courses(
        &self,
        draft: &StudentDraft,
        cohort: String,
    ) -> Result<StudentRow, GatewayError> {
        let now = Utc::now();
        let insert = StudentInsert {
            student_name: draft.student_name.clone(),
            cohort,
            status: draft.status,
            date_joined: now,
            last_login: now,
        };
        let student = self.gateway.insert_student(&insert).await?;

        try_join_all(
            draft
                .courses
                .iter()
                .map(|course| self.link_course(student.id, course)),
        )
        .await?;

        info!(student_id = %student.id, courses = draft.courses.len(), "roster: student added");
        Ok(student)
    }

    async fn apply_student_update(
        &self,
        student_id: Uuid,
        updates: &StudentUpdate,
        cohort: String,
    ) -> Result<StudentRow, GatewayError> {
        let patch = StudentPatch {
            student_name: updates.student_name.clone(),
            cohort,
            status: updates.status,
            last_login: Utc::now(),
        };
        let student = self.gateway.update_student(student_id, &patch).await?;

        if let Some(courses) = &updates.courses {
            self.gateway
                .delete_enrollments_for_student(student_id)
                .await?;
            for course in courses {
                self.link_course(student_id, course).await?;
            }
            info!(%student_id, relinked = courses.len(), "roster: enrollments replaced");
        }

        Ok(student)
    }

    /// Resolve `course` to a catalog row and insert the enrollment join row.
    async fn link_course(&self, student_id: Uuid, course: &CourseDraft) -> Result<(), GatewayError> {
        let course_row = self.resolve_course(course).await?;
        self.gateway
            .insert_enrollment(&EnrollmentInsert { student_id, course_id: course_row.id })
            .await?;
        Ok(())
    }

    /// Find the course by exact name or create it. Serialized through
    /// `course_resolve` so concurrent in-process callers cannot
    /// double-insert a name; a writer in another process still can.
    async fn resolve_course(&self, course: &CourseDraft) -> Result<CourseRow, GatewayError> {
        let _serial = self.course_resolve.lock().await;

        if let Some(existing) = self.gateway.find_course_by_name(&course.course_name).await? {
            return Ok(existing);
        }

        let insert = CourseInsert { course_name: course.course_name.clone(), course_code: course.course_code.clone() };
        let created = self.gateway.insert_course(&insert).await?;
        info!(course_id = %created.id, name = %created.course_name, "roster: course created");
        Ok(created)
    }

    // =========================================================================
    // STATE TRANSITIONS
    // =========================================================================

    /// Flip state into the in-flight shape and return the active filter year.
    async fn begin_operation(&self) -> String {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
        state.filters.year.clone()
    }

    async fn record_failure(&self, error: &GatewayError) {
        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(error.to_string());
    }
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
