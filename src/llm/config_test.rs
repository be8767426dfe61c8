use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_lock`]; `set_var`/`remove_var` race otherwise.
unsafe fn clear_llm_env() {
    unsafe {
        std::env::remove_var("LLM_API_KEY_ENV");
        std::env::remove_var("LLM_ENDPOINT");
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("TEST_HF_KEY");
    }
}

#[test]
fn from_env_defaults_to_hosted_endpoint() {
    let _guard = env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEST_HF_KEY");
        std::env::set_var("TEST_HF_KEY", "secret");
    }

    let cfg = InferenceConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(
        cfg.timeouts,
        InferenceTimeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEST_HF_KEY");
        std::env::set_var("TEST_HF_KEY", "secret");
        std::env::set_var("LLM_ENDPOINT", "https://inference.example/models/custom/");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = InferenceConfig::from_env().unwrap();
    assert_eq!(cfg.endpoint, "https://inference.example/models/custom");
    assert_eq!(cfg.timeouts, InferenceTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_missing_indirection_names_it() {
    let _guard = env_lock();
    unsafe { clear_llm_env() };

    let err = InferenceConfig::from_env().unwrap_err();
    assert!(matches!(err, InferenceError::MissingApiKey { var } if var == "LLM_API_KEY_ENV"));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_missing_key_names_pointed_variable() {
    let _guard = env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEST_HF_KEY");
    }

    let err = InferenceConfig::from_env().unwrap_err();
    assert!(matches!(err, InferenceError::MissingApiKey { var } if var == "TEST_HF_KEY"));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_ignores_unparseable_timeouts() {
    let _guard = env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_API_KEY_ENV", "TEST_HF_KEY");
        std::env::set_var("TEST_HF_KEY", "secret");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "not-a-number");
    }

    let cfg = InferenceConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_llm_env() };
}
