use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_lock`]; `set_var`/`remove_var` race otherwise.
unsafe fn clear_data_env() {
    unsafe {
        std::env::remove_var("DATA_API_URL");
        std::env::remove_var("DATA_API_KEY");
    }
}

// =========================================================================
// eq_filter + table_url
// =========================================================================

#[test]
fn eq_filter_prefixes_value() {
    assert_eq!(eq_filter("AY 2024-25"), "eq.AY 2024-25");
    assert_eq!(eq_filter("3fa85f64-5717-4562-b3fc-2c963f66afa6"), "eq.3fa85f64-5717-4562-b3fc-2c963f66afa6");
}

#[test]
fn table_url_joins_base_and_table() {
    assert_eq!(table_url("https://project.example", "students"), "https://project.example/rest/v1/students");
}

#[test]
fn student_select_embeds_courses_through_join_table() {
    assert!(STUDENT_SELECT.starts_with("*,student_courses("));
    assert!(STUDENT_SELECT.contains("courses(id,course_name,course_code)"));
}

// =========================================================================
// error_message
// =========================================================================

#[test]
fn error_message_prefers_server_message() {
    let body = r#"{"message":"duplicate key value violates unique constraint","code":"23505"}"#;
    assert_eq!(error_message(409, body), "duplicate key value violates unique constraint");
}

#[test]
fn error_message_falls_back_on_non_json_body() {
    assert_eq!(error_message(502, "<html>Bad Gateway</html>"), "gateway error: status 502");
}

#[test]
fn error_message_falls_back_on_empty_message() {
    assert_eq!(error_message(500, r#"{"hint":null}"#), "gateway error: status 500");
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn new_trims_trailing_slash() {
    let gateway = RestGateway::new("https://project.example/", "service-key").unwrap();
    assert_eq!(gateway.base_url, "https://project.example");
}

#[test]
fn from_env_requires_base_url() {
    let _guard = env_lock();
    unsafe { clear_data_env() };

    let err = RestGateway::from_env().unwrap_err();
    assert!(matches!(err, GatewayError::MissingConfig { var } if var == "DATA_API_URL"));

    unsafe { clear_data_env() };
}

#[test]
fn from_env_requires_api_key() {
    let _guard = env_lock();
    unsafe {
        clear_data_env();
        std::env::set_var("DATA_API_URL", "https://project.example");
    }

    let err = RestGateway::from_env().unwrap_err();
    assert!(matches!(err, GatewayError::MissingConfig { var } if var == "DATA_API_KEY"));

    unsafe { clear_data_env() };
}

#[test]
fn from_env_builds_with_both_variables() {
    let _guard = env_lock();
    unsafe {
        clear_data_env();
        std::env::set_var("DATA_API_URL", "https://project.example/");
        std::env::set_var("DATA_API_KEY", "service-key");
    }

    let gateway = RestGateway::from_env().unwrap();
    assert_eq!(gateway.base_url, "https://project.example");
    assert_eq!(gateway.api_key, "service-key");

    unsafe { clear_data_env() };
}
