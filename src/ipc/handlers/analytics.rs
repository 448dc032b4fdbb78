use serde_json::json;

use crate::engine;
use crate::ipc::helpers::{
    get_opt_str, get_required_str, get_trimester, require_class, require_student, require_subject,
    with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{Scope, Store};

fn analytics_student_average(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;
    let subject_id = get_required_str(params, "subjectId")?;
    require_subject(store, &subject_id)?;
    let trimester = get_trimester(params)?;

    let assessments = store.assessments(Scope::Subject(&subject_id))?;
    let grades = store.grades(Scope::Student(&student_id))?;
    let average = engine::student_average(&student_id, &subject_id, trimester, &assessments, &grades);

    Ok(json!({
        "studentId": student_id,
        "subjectId": subject_id,
        "trimester": trimester,
        "average": average,
        "gradeLevel": average.map(engine::grade_level),
    }))
}

fn analytics_class_stats(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    require_class(store, &class_id)?;
    let subject_id = get_required_str(params, "subjectId")?;
    require_subject(store, &subject_id)?;
    let trimester = get_trimester(params)?;

    let students = store.students(Scope::Class(&class_id))?;
    let assessments = store.assessments(Scope::Subject(&subject_id))?;
    let grades = store.grades(Scope::All)?;

    let class_average =
        engine::class_average(&class_id, &subject_id, trimester, &students, &assessments, &grades);
    let below = engine::below_average_stats(
        &class_id,
        &subject_id,
        trimester,
        &students,
        &assessments,
        &grades,
    );

    let rows: Vec<serde_json::Value> = students
        .iter()
        .map(|s| {
            let average =
                engine::student_average(&s.id, &subject_id, trimester, &assessments, &grades);
            json!({
                "studentId": s.id,
                "name": s.name,
                "average": average,
                "gradeLevel": average.map(engine::grade_level),
            })
        })
        .collect();

    Ok(json!({
        "classAverage": class_average,
        "belowAverage": below,
        "students": rows,
    }))
}

fn analytics_grade_distribution(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    require_class(store, &class_id)?;
    let subject_id = get_required_str(params, "subjectId")?;
    require_subject(store, &subject_id)?;
    let trimester = get_trimester(params)?;

    let students = store.students(Scope::Class(&class_id))?;
    let assessments = store.assessments(Scope::Subject(&subject_id))?;
    let grades = store.grades(Scope::All)?;

    let distribution = engine::grade_distribution(
        &class_id,
        &subject_id,
        trimester,
        &students,
        &assessments,
        &grades,
    );
    Ok(json!({ "distribution": distribution }))
}

fn analytics_performance_by_type(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    require_subject(store, &subject_id)?;
    let trimester = get_trimester(params)?;

    let assessments = store.assessments(Scope::Subject(&subject_id))?;
    let grades = store.grades(Scope::All)?;

    // Kinds with no graded assessments chart as zero bars.
    let breakdown = engine::performance_by_type(&subject_id, trimester, &assessments, &grades);
    Ok(json!({
        "test": breakdown.test.unwrap_or(0.0),
        "exam": breakdown.exam.unwrap_or(0.0),
        "assignment": breakdown.assignment.unwrap_or(0.0),
        "project": breakdown.project.unwrap_or(0.0),
        "quiz": breakdown.quiz.unwrap_or(0.0),
    }))
}

fn analytics_performance_trend(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    require_student(store, &student_id)?;
    let subject_id = get_opt_str(params, "subjectId");
    if let Some(sid) = subject_id.as_deref() {
        require_subject(store, sid)?;
    }

    let assessments = match subject_id.as_deref() {
        Some(sid) => store.assessments(Scope::Subject(sid))?,
        None => store.assessments(Scope::All)?,
    };
    let grades = store.grades(Scope::Student(&student_id))?;

    let trimesters =
        engine::trimester_breakdown(&student_id, subject_id.as_deref(), &assessments, &grades);
    let trend = engine::performance_trend(&trimesters);

    Ok(json!({
        "studentId": student_id,
        "trimesters": trimesters,
        "trend": trend,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.studentAverage" => Some(with_store(state, req, analytics_student_average)),
        "analytics.classStats" => Some(with_store(state, req, analytics_class_stats)),
        "analytics.gradeDistribution" => Some(with_store(state, req, analytics_grade_distribution)),
        "analytics.performanceByType" => {
            Some(with_store(state, req, analytics_performance_by_type))
        }
        "analytics.performanceTrend" => Some(with_store(state, req, analytics_performance_trend)),
        _ => None,
    }
}
