mod test_support;

use serde_json::json;
use std::io::BufReader;
use std::process::{ChildStdin, ChildStdout};
use test_support::{request_ok, spawn_sidecar, temp_dir};

struct Seed {
    student_id: String,
}

fn seed(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) -> Seed {
    let class = request_ok(
        stdin,
        reader,
        "s1",
        "classes.create",
        json!({ "name": "Turma 7B", "grade": "7", "year": 2025 }),
    );
    let class_id = class["class"]["id"].as_str().expect("id").to_string();

    let student = request_ok(
        stdin,
        reader,
        "s2",
        "students.create",
        json!({
            "name": "Tiago Lima",
            "email": "tiago@school.test",
            "processNumber": "EB-1",
            "classId": class_id,
            "birthDate": "2012-11-03"
        }),
    );
    let student_id = student["student"]["id"].as_str().expect("id").to_string();

    let subject = request_ok(
        stdin,
        reader,
        "s3",
        "subjects.create",
        json!({ "name": "Matemática", "code": "MAT-7B", "classId": class_id }),
    );
    let subject_id = subject["subject"]["id"].as_str().expect("id").to_string();

    for (i, (trimester, score)) in [(1, 81.0), (2, 90.0)].iter().enumerate() {
        let assessment = request_ok(
            stdin,
            reader,
            &format!("s4-{}", i),
            "assessments.create",
            json!({
                "name": format!("Prova T{}", trimester),
                "subjectId": subject_id,
                "trimester": trimester,
                "type": "exam",
                "maxScore": 100.0,
                "weight": 1.0,
                "date": format!("2025-0{}-15", trimester)
            }),
        );
        let assessment_id = assessment["assessment"]["id"].as_str().expect("id").to_string();
        let _ = request_ok(
            stdin,
            reader,
            &format!("s5-{}", i),
            "grades.record",
            json!({
                "studentId": student_id,
                "assessmentId": assessment_id,
                "score": score
            }),
        );
    }

    let _ = request_ok(
        stdin,
        reader,
        "s6",
        "attendance.record",
        json!({
            "studentId": student_id,
            "subjectId": subject_id,
            "date": "2025-02-20",
            "status": "presente"
        }),
    );

    Seed { student_id }
}

#[test]
fn report_card_email_renders_inline_html() {
    let workspace = temp_dir("schoolhub-email");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let seed = seed(&mut stdin, &mut reader);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.reportCardEmail",
        json!({ "studentId": seed.student_id, "trimester": 1 }),
    );
    let html = result["html"].as_str().expect("html");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Report Card - Tiago Lima</title>"));
    assert!(html.contains("Report Card - Trimester 1"));
    // No explicit school name falls back to the product name.
    assert!(html.contains("<h1 style=\"margin: 0;\">SchoolHub</h1>"));
    // Trimester 1 average is 81.00, grade B.
    assert!(html.contains("81.00%"), "missing subject average");
    assert!(html.contains("Matemática"));
    // The structured card rides along with the rendered body.
    assert_eq!(result["reportCard"]["overallGradeLevel"], json!("B"));

    let branded = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reports.reportCardEmail",
        json!({
            "studentId": seed.student_id,
            "trimester": 1,
            "schoolName": "Colégio Kuzola"
        }),
    );
    let branded_html = branded["html"].as_str().expect("html");
    assert!(branded_html.contains("<h1 style=\"margin: 0;\">Colégio Kuzola</h1>"));
    assert!(branded_html.contains("Colégio Kuzola - School Management System"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn bulletin_html_shows_identity_stats_and_filtered_grades() {
    let workspace = temp_dir("schoolhub-bulletin");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let seed = seed(&mut stdin, &mut reader);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.bulletinHtml",
        json!({ "studentId": seed.student_id }),
    );
    let html = result["html"].as_str().expect("html");
    assert!(html.contains("<h1>BOLETIM ESCOLAR</h1>"));
    assert!(html.contains("<strong>Nome:</strong> Tiago Lima"));
    assert!(html.contains("<strong>Turma:</strong> Turma 7B"));
    // Birth date is shown DD/MM/YYYY.
    assert!(html.contains("<strong>Data de Nascimento:</strong> 03/11/2012"));
    // Both trimester grades: mean of 81% and 90% is 85.50.
    assert!(html.contains("85.50%"), "missing overall average");
    assert!(html.contains("<strong>81/100</strong>"));
    assert!(html.contains("<strong>90/100</strong>"));
    // One attendance row, all present.
    assert!(html.contains("100.0%"), "missing presence rate");
    assert!(html.contains("<td>20/02/2025</td>"));

    // Trimester filter narrows the grade table only.
    let filtered = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reports.bulletinHtml",
        json!({ "studentId": seed.student_id, "trimester": 2 }),
    );
    let filtered_html = filtered["html"].as_str().expect("html");
    assert!(filtered_html.contains("<strong>90/100</strong>"));
    assert!(!filtered_html.contains("<strong>81/100</strong>"));
    assert!(filtered_html.contains("<td>20/02/2025</td>"), "attendance stays");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
