use chrono::NaiveDate;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{Assessment, Class, Guardian, Student, Subject, Teacher};
use crate::store::{Store, StoreError};

/// Error carried out of a handler body; `response` turns it into the
/// wire envelope for the request that produced it.
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        HandlerErr {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr::new("bad_params", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HandlerErr::new("not_found", message)
    }

    pub fn conflict(message: impl Into<String>, details: serde_json::Value) -> Self {
        HandlerErr {
            code: "conflict",
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let code = match &e {
            StoreError::Query(_) => "db_query_failed",
            StoreError::Insert(_) => "db_insert_failed",
            StoreError::Delete(_) => "db_delete_failed",
            StoreError::Tx(_) => "db_tx_failed",
            StoreError::Commit(_) => "db_commit_failed",
        };
        HandlerErr::new(code, e.to_string())
    }
}

/// Runs a handler body against the open store, or answers `no_workspace`
/// when none has been selected yet.
pub fn with_store<F>(state: &mut AppState, req: &Request, body: F) -> serde_json::Value
where
    F: FnOnce(&mut dyn Store, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match body(store, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Required string that must survive trimming, for names, codes and the like.
pub fn get_required_text(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let value = get_required_str(params, key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(HandlerErr::bad_params(format!("{} must not be empty", key)));
    }
    Ok(value)
}

pub fn get_opt_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_f64(params: &serde_json::Value, key: &str) -> Result<f64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_opt_i64(params: &serde_json::Value, key: &str) -> Option<i64> {
    params.get(key).and_then(|v| v.as_i64())
}

pub fn check_trimester(trimester: i64) -> Result<(), HandlerErr> {
    if (1..=3).contains(&trimester) {
        Ok(())
    } else {
        Err(HandlerErr::bad_params("trimester must be between 1 and 3"))
    }
}

pub fn get_trimester(params: &serde_json::Value) -> Result<i64, HandlerErr> {
    let trimester = get_required_i64(params, "trimester")?;
    check_trimester(trimester)?;
    Ok(trimester)
}

pub fn get_opt_trimester(params: &serde_json::Value) -> Result<Option<i64>, HandlerErr> {
    match get_opt_i64(params, "trimester") {
        Some(t) => {
            check_trimester(t)?;
            Ok(Some(t))
        }
        None => Ok(None),
    }
}

pub fn check_date(key: &str, value: &str) -> Result<(), HandlerErr> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)));
    }
    Ok(())
}

pub fn get_required_date(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let value = get_required_str(params, key)?;
    check_date(key, &value)?;
    Ok(value)
}

pub fn get_opt_date(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<String>, HandlerErr> {
    match get_opt_str(params, key) {
        Some(value) => {
            check_date(key, &value)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn require_class(store: &dyn Store, id: &str) -> Result<Class, HandlerErr> {
    store
        .class(id)?
        .ok_or_else(|| HandlerErr::not_found("class not found"))
}

pub fn require_subject(store: &dyn Store, id: &str) -> Result<Subject, HandlerErr> {
    store
        .subject(id)?
        .ok_or_else(|| HandlerErr::not_found("subject not found"))
}

pub fn require_student(store: &dyn Store, id: &str) -> Result<Student, HandlerErr> {
    store
        .student(id)?
        .ok_or_else(|| HandlerErr::not_found("student not found"))
}

pub fn require_teacher(store: &dyn Store, id: &str) -> Result<Teacher, HandlerErr> {
    store
        .teacher(id)?
        .ok_or_else(|| HandlerErr::not_found("teacher not found"))
}

pub fn require_guardian(store: &dyn Store, id: &str) -> Result<Guardian, HandlerErr> {
    store
        .guardian(id)?
        .ok_or_else(|| HandlerErr::not_found("guardian not found"))
}

pub fn require_assessment(store: &dyn Store, id: &str) -> Result<Assessment, HandlerErr> {
    store
        .assessment(id)?
        .ok_or_else(|| HandlerErr::not_found("assessment not found"))
}

pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
