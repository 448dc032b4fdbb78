use serde_json::json;
use uuid::Uuid;

use crate::engine;
use crate::ipc::helpers::{
    get_opt_str, get_required_date, get_required_str, require_student, require_subject,
    require_teacher, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceRecord, AttendanceStatus, TeacherAttendanceRecord};
use crate::store::{Scope, Store};

fn parse_status(raw: &str) -> Result<AttendanceStatus, HandlerErr> {
    AttendanceStatus::parse(raw)
        .ok_or_else(|| HandlerErr::bad_params("unknown attendance status"))
}

// One row per (student, subject, date); marking again overwrites.
fn attendance_record(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;
    let subject_id = get_required_str(params, "subjectId")?;
    require_subject(store, &subject_id)?;
    let date = get_required_date(params, "date")?;
    let status = parse_status(&get_required_str(params, "status")?)?;
    let note = get_opt_str(params, "note");

    let existing = store.attendance(Scope::Student(&student_id))?;
    let id = existing
        .iter()
        .find(|r| r.subject_id == subject_id && r.date == date)
        .map(|r| r.id.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let record = AttendanceRecord {
        id,
        student_id,
        subject_id,
        date,
        status,
        note,
    };
    store.save_attendance(&record)?;
    Ok(json!({ "record": record }))
}

// Roll-call view: every student of the subject's class, marked or not.
fn attendance_list_by_date(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let subject = require_subject(store, &subject_id)?;
    let date = get_required_date(params, "date")?;

    let students = store.students(Scope::Class(&subject.class_id))?;
    let records = store.attendance(Scope::Subject(&subject_id))?;

    let rows: Vec<serde_json::Value> = students
        .iter()
        .map(|s| {
            let marked = records.iter().find(|r| r.student_id == s.id && r.date == date);
            json!({
                "studentId": s.id,
                "studentName": s.name,
                "status": marked.map(|r| r.status),
                "note": marked.and_then(|r| r.note.clone()),
                "recordId": marked.map(|r| r.id.clone()),
            })
        })
        .collect();

    Ok(json!({ "date": date, "subjectId": subject_id, "rows": rows }))
}

fn attendance_list_by_student(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;
    let records = store.attendance(Scope::Student(&student_id))?;
    Ok(json!({ "records": records }))
}

fn attendance_student_summary(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;
    let statuses: Vec<AttendanceStatus> = store
        .attendance(Scope::Student(&student_id))?
        .iter()
        .map(|r| r.status)
        .collect();
    let summary = engine::attendance_summary(&statuses);
    Ok(json!({ "studentId": student_id, "summary": summary }))
}

// Teacher attendance is one row per (teacher, date); no subject dimension.
fn attendance_record_teacher(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    require_teacher(store, &teacher_id)?;
    let date = get_required_date(params, "date")?;
    let status = parse_status(&get_required_str(params, "status")?)?;

    let existing = store.teacher_attendance(Scope::Teacher(&teacher_id))?;
    let id = existing
        .iter()
        .find(|r| r.date == date)
        .map(|r| r.id.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let record = TeacherAttendanceRecord {
        id,
        teacher_id,
        date,
        status,
    };
    store.save_teacher_attendance(&record)?;
    Ok(json!({ "record": record }))
}

fn attendance_teacher_summary(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    require_teacher(store, &teacher_id)?;
    let statuses: Vec<AttendanceStatus> = store
        .teacher_attendance(Scope::Teacher(&teacher_id))?
        .iter()
        .map(|r| r.status)
        .collect();
    let summary = engine::attendance_summary(&statuses);
    Ok(json!({ "teacherId": teacher_id, "summary": summary }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.record" => Some(with_store(state, req, attendance_record)),
        "attendance.listByDate" => Some(with_store(state, req, attendance_list_by_date)),
        "attendance.listByStudent" => Some(with_store(state, req, attendance_list_by_student)),
        "attendance.studentSummary" => Some(with_store(state, req, attendance_student_summary)),
        "attendance.recordTeacher" => Some(with_store(state, req, attendance_record_teacher)),
        "attendance.teacherSummary" => Some(with_store(state, req, attendance_teacher_summary)),
        _ => None,
    }
}
