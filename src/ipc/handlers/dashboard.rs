use std::collections::HashSet;

use serde_json::json;

use crate::engine;
use crate::ipc::helpers::{
    get_required_str, require_guardian, require_student, require_teacher, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceStatus, StudentStatus, TeacherStatus};
use crate::store::{Scope, Store};

fn dashboard_admin_stats(
    store: &mut dyn Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let students = store.students(Scope::All)?;
    let teachers = store.teachers()?;
    let classes = store.classes()?;
    let subjects = store.subjects(Scope::All)?;
    let assessments = store.assessments(Scope::All)?;

    Ok(json!({
        "activeStudents": students.iter().filter(|s| s.status == StudentStatus::Active).count(),
        "activeTeachers": teachers.iter().filter(|t| t.status == TeacherStatus::Active).count(),
        "classes": classes.len(),
        "subjects": subjects.len(),
        "assessments": assessments.len(),
    }))
}

fn dashboard_teacher_stats(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    require_teacher(store, &teacher_id)?;

    let subjects = store.subjects(Scope::Teacher(&teacher_id))?;
    let subject_ids: HashSet<&str> = subjects.iter().map(|s| s.id.as_str()).collect();
    let class_ids: HashSet<&str> = subjects.iter().map(|s| s.class_id.as_str()).collect();

    let assessments = store.assessments(Scope::All)?;
    let taught: Vec<_> = assessments
        .iter()
        .filter(|a| subject_ids.contains(a.subject_id.as_str()))
        .collect();

    let grades = store.grades(Scope::All)?;
    let mut graded_students: HashSet<&str> = HashSet::new();
    let mut percentages = Vec::new();
    for g in &grades {
        let Some(a) = taught.iter().find(|a| a.id == g.assessment_id) else {
            continue;
        };
        graded_students.insert(g.student_id.as_str());
        percentages.push(engine::grade_percentage(g.score, a.max_score));
    }

    Ok(json!({
        "classes": class_ids.len(),
        "students": graded_students.len(),
        "assessments": taught.len(),
        "averageGrade": engine::mean(&percentages).unwrap_or(0.0),
    }))
}

fn dashboard_guardian_stats(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let guardian_id = get_required_str(params, "guardianId")?;
    require_guardian(store, &guardian_id)?;

    let students = store.students(Scope::Guardian(&guardian_id))?;
    let assessments = store.assessments(Scope::All)?;
    let classes = store.classes()?;

    let mut rows = Vec::new();
    let mut total_grades = 0usize;
    let mut all_percentages: Vec<f64> = Vec::new();
    for s in &students {
        let grades = store.grades(Scope::Student(&s.id))?;
        let percentages: Vec<f64> = grades
            .iter()
            .filter_map(|g| {
                let a = assessments.iter().find(|a| a.id == g.assessment_id)?;
                Some(engine::grade_percentage(g.score, a.max_score))
            })
            .collect();
        total_grades += grades.len();
        all_percentages.extend(&percentages);
        rows.push(json!({
            "studentId": s.id,
            "name": s.name,
            "className": classes.iter().find(|c| c.id == s.class_id).map(|c| c.name.clone()),
            "gradeCount": grades.len(),
            "average": engine::mean(&percentages).unwrap_or(0.0),
        }));
    }

    Ok(json!({
        "students": rows,
        "totals": {
            "students": students.len(),
            "grades": total_grades,
            "average": engine::mean(&all_percentages).unwrap_or(0.0),
        }
    }))
}

fn dashboard_student_stats(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;

    let grades = store.grades(Scope::Student(&student_id))?;
    let assessments = store.assessments(Scope::All)?;
    let mut subject_ids: HashSet<&str> = HashSet::new();
    let mut percentages = Vec::new();
    for g in &grades {
        let Some(a) = assessments.iter().find(|a| a.id == g.assessment_id) else {
            continue;
        };
        subject_ids.insert(a.subject_id.as_str());
        percentages.push(engine::grade_percentage(g.score, a.max_score));
    }

    let statuses: Vec<AttendanceStatus> = store
        .attendance(Scope::Student(&student_id))?
        .iter()
        .map(|r| r.status)
        .collect();
    let attendance = engine::attendance_summary(&statuses);

    Ok(json!({
        "gradeCount": grades.len(),
        "subjects": subject_ids.len(),
        "average": engine::mean(&percentages).unwrap_or(0.0),
        "attendanceRate": attendance.presence_rate.unwrap_or(0.0),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.adminStats" => Some(with_store(state, req, dashboard_admin_stats)),
        "dashboard.teacherStats" => Some(with_store(state, req, dashboard_teacher_stats)),
        "dashboard.guardianStats" => Some(with_store(state, req, dashboard_guardian_stats)),
        "dashboard.studentStats" => Some(with_store(state, req, dashboard_student_stats)),
        _ => None,
    }
}
