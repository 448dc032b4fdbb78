use serde_json::json;
use uuid::Uuid;

use crate::ipc::helpers::{
    get_opt_str, get_required_str, get_required_text, now_iso, require_class, require_subject,
    require_teacher, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Subject;
use crate::store::{Scope, Store};

fn subjects_list(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_opt_str(params, "classId");
    let teacher_id = get_opt_str(params, "teacherId");

    let subjects = if let Some(cid) = class_id.as_deref() {
        store.subjects(Scope::Class(cid))?
    } else if let Some(tid) = teacher_id.as_deref() {
        store.subjects(Scope::Teacher(tid))?
    } else {
        store.subjects(Scope::All)?
    };

    Ok(json!({ "subjects": subjects }))
}

fn subjects_get(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let subject = require_subject(store, &subject_id)?;
    Ok(json!({ "subject": subject }))
}

fn subjects_create(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let code = get_required_text(params, "code")?;
    let description = get_opt_str(params, "description");
    let class_id = get_required_str(params, "classId")?;
    require_class(store, &class_id)?;
    let teacher_id = get_opt_str(params, "teacherId");
    if let Some(tid) = teacher_id.as_deref() {
        require_teacher(store, tid)?;
    }

    let subject = Subject {
        id: Uuid::new_v4().to_string(),
        name,
        code,
        description,
        class_id,
        teacher_id,
        created_at: now_iso(),
    };
    store.save_subject(&subject)?;
    Ok(json!({ "subject": subject }))
}

fn subjects_update(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let mut subject = require_subject(store, &subject_id)?;

    if params.get("name").is_some() {
        subject.name = get_required_text(params, "name")?;
    }
    if params.get("code").is_some() {
        subject.code = get_required_text(params, "code")?;
    }
    match params.get("description") {
        None => {}
        Some(serde_json::Value::Null) => subject.description = None,
        Some(v) => {
            let text = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params("description must be a string"))?;
            subject.description = Some(text.to_string());
        }
    }
    // null unassigns the teacher, a string reassigns.
    match params.get("teacherId") {
        None => {}
        Some(serde_json::Value::Null) => subject.teacher_id = None,
        Some(v) => {
            let tid = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params("teacherId must be a string"))?;
            require_teacher(store, tid)?;
            subject.teacher_id = Some(tid.to_string());
        }
    }

    store.save_subject(&subject)?;
    Ok(json!({ "subject": subject }))
}

fn subjects_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    if !store.delete_subject(&subject_id)? {
        return Err(HandlerErr::not_found("subject not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(with_store(state, req, subjects_list)),
        "subjects.get" => Some(with_store(state, req, subjects_get)),
        "subjects.create" => Some(with_store(state, req, subjects_create)),
        "subjects.update" => Some(with_store(state, req, subjects_update)),
        "subjects.delete" => Some(with_store(state, req, subjects_delete)),
        _ => None,
    }
}
