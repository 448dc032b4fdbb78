use serde_json::json;

use crate::ipc::helpers::{
    get_opt_str, get_opt_trimester, get_required_str, get_trimester, require_student, with_store,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::report;
use crate::store::{Scope, Store};

fn build_card(
    store: &dyn Store,
    params: &serde_json::Value,
) -> Result<report::ReportCard, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let student = require_student(store, &student_id)?;
    let trimester = get_trimester(params)?;

    let subjects = store.subjects(Scope::Class(&student.class_id))?;
    let assessments = store.assessments(Scope::Class(&student.class_id))?;
    let grades = store.grades(Scope::Student(&student_id))?;

    Ok(report::build_report_card(
        &student,
        trimester,
        &subjects,
        &assessments,
        &grades,
    ))
}

fn reports_report_card(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let card = build_card(store, params)?;
    Ok(json!({ "reportCard": card }))
}

fn reports_report_card_email(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let card = build_card(store, params)?;
    let school_name =
        get_opt_str(params, "schoolName").unwrap_or_else(|| "SchoolHub".to_string());
    let html = report::render_report_email(&card, &school_name);
    Ok(json!({ "reportCard": card, "html": html }))
}

fn reports_bulletin_html(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let student = require_student(store, &student_id)?;
    // Optional filter; it narrows the grade table, never the attendance log.
    let trimester = get_opt_trimester(params)?;

    let class_name = store.class(&student.class_id)?.map(|c| c.name);
    let subjects = store.subjects(Scope::All)?;
    let subject_name = |id: &str| {
        subjects
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "N/A".to_string())
    };

    let assessments = store.assessments(Scope::All)?;
    let grades = store.grades(Scope::Student(&student_id))?;
    let mut grade_lines = Vec::new();
    for g in &grades {
        let Some(a) = assessments.iter().find(|a| a.id == g.assessment_id) else {
            continue;
        };
        if let Some(t) = trimester {
            if a.trimester != t {
                continue;
            }
        }
        grade_lines.push(report::BulletinGradeLine {
            subject_name: subject_name(&a.subject_id),
            score: g.score,
            max_score: a.max_score,
            kind: a.kind.as_str().to_string(),
            date: a.date.clone(),
        });
    }

    let attendance = store.attendance(Scope::Student(&student_id))?;
    let attendance_lines: Vec<report::BulletinAttendanceLine> = attendance
        .iter()
        .map(|r| report::BulletinAttendanceLine {
            subject_name: subject_name(&r.subject_id),
            date: r.date.clone(),
            status: r.status,
        })
        .collect();

    let html = report::render_bulletin(&student, class_name.as_deref(), &grade_lines, &attendance_lines);
    Ok(json!({ "studentId": student_id, "html": html }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.reportCard" => Some(with_store(state, req, reports_report_card)),
        "reports.reportCardEmail" => Some(with_store(state, req, reports_report_card_email)),
        "reports.bulletinHtml" => Some(with_store(state, req, reports_bulletin_html)),
        _ => None,
    }
}
