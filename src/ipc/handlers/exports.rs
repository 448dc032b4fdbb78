use serde_json::json;

use crate::csv;
use crate::engine;
use crate::ipc::helpers::{get_opt_str, get_opt_trimester, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::report;
use crate::store::{Scope, Store};

fn export_grades_csv(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_opt_str(params, "classId");
    let subject_id = get_opt_str(params, "subjectId");
    let trimester = get_opt_trimester(params)?;
    let out_path = get_opt_str(params, "outPath");

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

    let students = store.students(Scope::All)?;
    let subjects = store.subjects(Scope::All)?;
    let grades = store.grades(Scope::All)?;

    let mut lines = vec![csv::csv_record(&[
        "Date".to_string(),
        "Student".to_string(),
        "Subject".to_string(),
        "Type".to_string(),
        "Score".to_string(),
        "Max Score".to_string(),
        "Percentage".to_string(),
        "Trimester".to_string(),
        "Notes".to_string(),
    ])];
    let mut row_count = 0usize;
    for grade in &grades {
        let Some(assessment) = assessments.iter().find(|a| a.id == grade.assessment_id) else {
            continue;
        };
        let student_name = students
            .iter()
            .find(|s| s.id == grade.student_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "N/A".to_string());
        let subject_name = subjects
            .iter()
            .find(|s| s.id == assessment.subject_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Desconhecida".to_string());
        let percentage = engine::grade_percentage(grade.score, assessment.max_score);

        lines.push(csv::csv_record(&[
            report::display_date(&assessment.date),
            student_name,
            subject_name,
            assessment.kind.as_str().to_string(),
            grade.score.to_string(),
            assessment.max_score.to_string(),
            format!("{:.1}", percentage),
            assessment.trimester.to_string(),
            grade.notes.clone().unwrap_or_default(),
        ]));
        row_count += 1;
    }
    let csv_text = lines.join("\n");

    if let Some(path) = out_path.as_deref() {
        std::fs::write(path, &csv_text).map_err(|e| HandlerErr {
            code: "io_failed",
            message: e.to_string(),
            details: Some(json!({ "path": path })),
        })?;
    }

    Ok(json!({ "csv": csv_text, "rows": row_count, "outPath": out_path }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.gradesCsv" => Some(with_store(state, req, export_grades_csv)),
        _ => None,
    }
}
