use serde_json::json;
use uuid::Uuid;

use crate::ipc::helpers::{
    get_required_i64, get_required_str, get_required_text, now_iso, require_class, with_store,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Class;
use crate::store::{Scope, Store};

fn classes_list(
    store: &mut dyn Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let classes = store.classes()?;
    let students = store.students(Scope::All)?;
    let subjects = store.subjects(Scope::All)?;

    // Include basic counts so the UI can show a useful dashboard.
    let rows: Vec<serde_json::Value> = classes
        .iter()
        .map(|c| {
            let student_count = students.iter().filter(|s| s.class_id == c.id).count();
            let subject_count = subjects.iter().filter(|s| s.class_id == c.id).count();
            json!({
                "id": c.id,
                "name": c.name,
                "grade": c.grade,
                "year": c.year,
                "createdAt": c.created_at,
                "studentCount": student_count,
                "subjectCount": subject_count,
            })
        })
        .collect();

    Ok(json!({ "classes": rows }))
}

fn classes_get(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let class = require_class(store, &class_id)?;
    Ok(json!({ "class": class }))
}

fn classes_create(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let grade = get_required_text(params, "grade")?;
    let year = get_required_i64(params, "year")?;

    let class = Class {
        id: Uuid::new_v4().to_string(),
        name,
        grade,
        year,
        created_at: now_iso(),
    };
    store.save_class(&class)?;
    Ok(json!({ "class": class }))
}

fn classes_update(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let mut class = require_class(store, &class_id)?;

    if params.get("name").is_some() {
        class.name = get_required_text(params, "name")?;
    }
    if params.get("grade").is_some() {
        class.grade = get_required_text(params, "grade")?;
    }
    if params.get("year").is_some() {
        class.year = get_required_i64(params, "year")?;
    }

    store.save_class(&class)?;
    Ok(json!({ "class": class }))
}

fn classes_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    if !store.delete_class(&class_id)? {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(with_store(state, req, classes_list)),
        "classes.get" => Some(with_store(state, req, classes_get)),
        "classes.create" => Some(with_store(state, req, classes_create)),
        "classes.update" => Some(with_store(state, req, classes_update)),
        "classes.delete" => Some(with_store(state, req, classes_delete)),
        _ => None,
    }
}
