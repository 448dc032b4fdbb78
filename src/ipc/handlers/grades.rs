use serde_json::json;
use uuid::Uuid;

use crate::ipc::helpers::{
    get_opt_str, get_required_f64, get_required_str, require_assessment, require_student,
    with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use crate::store::{Scope, Store};

// Recording twice for the same (student, assessment) pair replaces the
// earlier score instead of stacking a second row.
fn grades_record(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;
    let assessment_id = get_required_str(params, "assessmentId")?;
    let assessment = require_assessment(store, &assessment_id)?;

    let score = get_required_f64(params, "score")?;
    if score < 0.0 || score > assessment.max_score {
        return Err(HandlerErr {
            code: "bad_params",
            message: format!("score must be between 0 and {}", assessment.max_score),
            details: Some(json!({ "maxScore": assessment.max_score })),
        });
    }
    let submitted_at = get_opt_str(params, "submittedAt");
    let notes = get_opt_str(params, "notes");

    let existing = store.grades(Scope::Assessment(&assessment_id))?;
    let id = existing
        .iter()
        .find(|g| g.student_id == student_id)
        .map(|g| g.id.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let grade = Grade {
        id,
        student_id,
        assessment_id,
        score,
        submitted_at,
        notes,
    };
    store.save_grade(&grade)?;
    Ok(json!({ "grade": grade }))
}

fn grades_list(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_opt_str(params, "studentId");
    let assessment_id = get_opt_str(params, "assessmentId");

    let grades = if let Some(sid) = student_id.as_deref() {
        store.grades(Scope::Student(sid))?
    } else if let Some(aid) = assessment_id.as_deref() {
        store.grades(Scope::Assessment(aid))?
    } else {
        store.grades(Scope::All)?
    };

    Ok(json!({ "grades": grades }))
}

fn grades_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let grade_id = get_required_str(params, "gradeId")?;
    if !store.delete_grade(&grade_id)? {
        return Err(HandlerErr::not_found("grade not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.record" => Some(with_store(state, req, grades_record)),
        "grades.list" => Some(with_store(state, req, grades_list)),
        "grades.delete" => Some(with_store(state, req, grades_delete)),
        _ => None,
    }
}
