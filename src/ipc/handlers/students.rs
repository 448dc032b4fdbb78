use serde_json::json;
use uuid::Uuid;

use crate::ipc::helpers::{
    check_date, get_opt_date, get_opt_str, get_required_str, get_required_text, require_class,
    require_guardian, require_student, today, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Student, StudentStatus};
use crate::store::{Scope, Store};

fn ensure_unique_process_number(
    store: &dyn Store,
    process_number: &str,
    skip_id: Option<&str>,
) -> Result<(), HandlerErr> {
    let students = store.students(Scope::All)?;
    let taken = students
        .iter()
        .any(|s| s.process_number == process_number && Some(s.id.as_str()) != skip_id);
    if taken {
        return Err(HandlerErr::conflict(
            "process number already in use",
            json!({ "processNumber": process_number }),
        ));
    }
    Ok(())
}

fn students_list(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_opt_str(params, "classId");
    let guardian_id = get_opt_str(params, "guardianId");

    let students = if let Some(cid) = class_id.as_deref() {
        store.students(Scope::Class(cid))?
    } else if let Some(gid) = guardian_id.as_deref() {
        store.students(Scope::Guardian(gid))?
    } else {
        store.students(Scope::All)?
    };

    Ok(json!({ "students": students }))
}

fn students_get(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let student = require_student(store, &student_id)?;
    Ok(json!({ "student": student }))
}

fn students_create(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let email = get_required_text(params, "email")?;
    let process_number = get_required_text(params, "processNumber")?;
    let birth_date = get_opt_date(params, "birthDate")?;
    let class_id = get_required_str(params, "classId")?;
    require_class(store, &class_id)?;
    let guardian_id = get_opt_str(params, "guardianId");
    if let Some(gid) = guardian_id.as_deref() {
        require_guardian(store, gid)?;
    }
    let status = match get_opt_str(params, "status") {
        Some(raw) => StudentStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params("unknown student status"))?,
        None => StudentStatus::Active,
    };
    let enrollment_date = match get_opt_date(params, "enrollmentDate")? {
        Some(d) => d,
        None => today(),
    };

    ensure_unique_process_number(store, &process_number, None)?;

    let student = Student {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        process_number,
        birth_date,
        class_id,
        guardian_id,
        status,
        enrollment_date,
    };
    store.save_student(&student)?;
    Ok(json!({ "student": student }))
}

fn students_update(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let mut student = require_student(store, &student_id)?;

    if params.get("name").is_some() {
        student.name = get_required_text(params, "name")?;
    }
    if params.get("email").is_some() {
        student.email = get_required_text(params, "email")?;
    }
    if params.get("processNumber").is_some() {
        let process_number = get_required_text(params, "processNumber")?;
        ensure_unique_process_number(store, &process_number, Some(&student.id))?;
        student.process_number = process_number;
    }
    match params.get("birthDate") {
        None => {}
        Some(serde_json::Value::Null) => student.birth_date = None,
        Some(v) => {
            let raw = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params("birthDate must be a string"))?;
            check_date("birthDate", raw)?;
            student.birth_date = Some(raw.to_string());
        }
    }
    // Moving between classes is a plain re-parent; grades and attendance
    // stay attached to the student.
    if params.get("classId").is_some() {
        let class_id = get_required_str(params, "classId")?;
        require_class(store, &class_id)?;
        student.class_id = class_id;
    }
    match params.get("guardianId") {
        None => {}
        Some(serde_json::Value::Null) => student.guardian_id = None,
        Some(v) => {
            let gid = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params("guardianId must be a string"))?;
            require_guardian(store, gid)?;
            student.guardian_id = Some(gid.to_string());
        }
    }
    if let Some(raw) = get_opt_str(params, "status") {
        student.status = StudentStatus::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params("unknown student status"))?;
    }
    if params.get("enrollmentDate").is_some() {
        let raw = get_required_str(params, "enrollmentDate")?;
        check_date("enrollmentDate", &raw)?;
        student.enrollment_date = raw;
    }

    store.save_student(&student)?;
    Ok(json!({ "student": student }))
}

fn students_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    if !store.delete_student(&student_id)? {
        return Err(HandlerErr::not_found("student not found"));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_store(state, req, students_list)),
        "students.get" => Some(with_store(state, req, students_get)),
        "students.create" => Some(with_store(state, req, students_create)),
        "students.update" => Some(with_store(state, req, students_update)),
        "students.delete" => Some(with_store(state, req, students_delete)),
        _ => None,
    }
}
