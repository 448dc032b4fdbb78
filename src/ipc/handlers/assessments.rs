use serde_json::json;
use uuid::Uuid;

use crate::ipc::helpers::{
    check_trimester, get_opt_str, get_opt_trimester, get_required_date, get_required_f64,
    get_required_i64, get_required_str, get_required_text, get_trimester, now_iso,
    require_assessment, require_subject, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Assessment, AssessmentKind};
use crate::store::{Scope, Store};

fn check_max_score(max_score: f64) -> Result<(), HandlerErr> {
    if max_score > 0.0 {
        Ok(())
    } else {
        Err(HandlerErr::bad_params("maxScore must be positive"))
    }
}

fn check_weight(weight: f64) -> Result<(), HandlerErr> {
    if weight >= 0.0 {
        Ok(())
    } else {
        Err(HandlerErr::bad_params("weight must not be negative"))
    }
}

fn parse_kind(raw: &str) -> Result<AssessmentKind, HandlerErr> {
    AssessmentKind::parse(raw).ok_or_else(|| HandlerErr::bad_params("unknown assessment type"))
}

fn assessments_list(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_opt_str(params, "subjectId");
    let class_id = get_opt_str(params, "classId");
    let trimester = get_opt_trimester(params)?;

    let mut assessments = if let Some(sid) = subject_id.as_deref() {
        store.assessments(Scope::Subject(sid))?
    } else if let Some(cid) = class_id.as_deref() {
        store.assessments(Scope::Class(cid))?
    } else {
        store.assessments(Scope::All)?
    };
    if let Some(t) = trimester {
        assessments.retain(|a| a.trimester == t);
    }

    Ok(json!({ "assessments": assessments }))
}

fn assessments_get(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let assessment_id = get_required_str(params, "assessmentId")?;
    let assessment = require_assessment(store, &assessment_id)?;
    Ok(json!({ "assessment": assessment }))
}

fn assessments_create(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let subject_id = get_required_str(params, "subjectId")?;
    let subject = require_subject(store, &subject_id)?;
    let trimester = get_trimester(params)?;
    let kind = parse_kind(&get_required_str(params, "type")?)?;
    let max_score = get_required_f64(params, "maxScore")?;
    check_max_score(max_score)?;
    let weight = get_required_f64(params, "weight")?;
    check_weight(weight)?;
    let date = get_required_date(params, "date")?;

    // The class link is derived from the subject, never taken from params.
    let assessment = Assessment {
        id: Uuid::new_v4().to_string(),
        name,
        subject_id,
        class_id: subject.class_id,
        trimester,
        kind,
        max_score,
        weight,
        date,
        created_at: now_iso(),
    };
    store.save_assessment(&assessment)?;
    Ok(json!({ "assessment": assessment }))
}

fn assessments_update(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let assessment_id = get_required_str(params, "assessmentId")?;
    let mut assessment = require_assessment(store, &assessment_id)?;

    if params.get("name").is_some() {
        assessment.name = get_required_text(params, "name")?;
    }
    if params.get("trimester").is_some() {
        let trimester = get_required_i64(params, "trimester")?;
        check_trimester(trimester)?;
        assessment.trimester = trimester;
    }
    if params.get("type").is_some() {
        assessment.kind = parse_kind(&get_required_str(params, "type")?)?;
    }
    if params.get("maxScore").is_some() {
        let max_score = get_required_f64(params, "maxScore")?;
        check_max_score(max_score)?;
        assessment.max_score = max_score;
    }
    if params.get("weight").is_some() {
        let weight = get_required_f64(params, "weight")?;
        check_weight(weight)?;
        assessment.weight = weight;
    }
    if params.get("date").is_some() {
        assessment.date = get_required_date(params, "date")?;
    }

    store.save_assessment(&assessment)?;
    Ok(json!({ "assessment": assessment }))
}

fn assessments_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let assessment_id = get_required_str(params, "assessmentId")?;
    if !store.delete_assessment(&assessment_id)? {
        return Err(HandlerErr::not_found("assessment not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.list" => Some(with_store(state, req, assessments_list)),
        "assessments.get" => Some(with_store(state, req, assessments_get)),
        "assessments.create" => Some(with_store(state, req, assessments_create)),
        "assessments.update" => Some(with_store(state, req, assessments_update)),
        "assessments.delete" => Some(with_store(state, req, assessments_delete)),
        _ => None,
    }
}
