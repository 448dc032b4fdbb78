use serde_json::json;
use uuid::Uuid;

use crate::ipc::helpers::{
    check_date, get_opt_date, get_opt_str, get_required_str, get_required_text, require_teacher,
    today, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Teacher, TeacherStatus};
use crate::store::Store;

fn teachers_list(
    store: &mut dyn Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teachers = store.teachers()?;
    Ok(json!({ "teachers": teachers }))
}

fn teachers_get(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    let teacher = require_teacher(store, &teacher_id)?;
    Ok(json!({ "teacher": teacher }))
}

fn teachers_create(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let email = get_required_text(params, "email")?;
    let phone = get_required_text(params, "phone")?;
    let hire_date = match get_opt_date(params, "hireDate")? {
        Some(d) => d,
        None => today(),
    };
    let status = match get_opt_str(params, "status") {
        Some(raw) => TeacherStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params("unknown teacher status"))?,
        None => TeacherStatus::Active,
    };

    let teacher = Teacher {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        phone,
        hire_date,
        status,
    };
    store.save_teacher(&teacher)?;
    Ok(json!({ "teacher": teacher }))
}

fn teachers_update(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    let mut teacher = require_teacher(store, &teacher_id)?;

    if params.get("name").is_some() {
        teacher.name = get_required_text(params, "name")?;
    }
    if params.get("email").is_some() {
        teacher.email = get_required_text(params, "email")?;
    }
    if params.get("phone").is_some() {
        teacher.phone = get_required_text(params, "phone")?;
    }
    if params.get("hireDate").is_some() {
        let raw = get_required_str(params, "hireDate")?;
        check_date("hireDate", &raw)?;
        teacher.hire_date = raw;
    }
    if let Some(raw) = get_opt_str(params, "status") {
        teacher.status = TeacherStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params("unknown teacher status"))?;
    }

    store.save_teacher(&teacher)?;
    Ok(json!({ "teacher": teacher }))
}

fn teachers_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    if !store.delete_teacher(&teacher_id)? {
        return Err(HandlerErr::not_found("teacher not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(with_store(state, req, teachers_list)),
        "teachers.get" => Some(with_store(state, req, teachers_get)),
        "teachers.create" => Some(with_store(state, req, teachers_create)),
        "teachers.update" => Some(with_store(state, req, teachers_update)),
        "teachers.delete" => Some(with_store(state, req, teachers_delete)),
        _ => None,
    }
}
