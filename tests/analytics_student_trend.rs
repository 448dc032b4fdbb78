mod test_support;

use serde_json::json;
use std::io::BufReader;
use std::process::{ChildStdin, ChildStdout};
use test_support::{request_ok, spawn_sidecar, temp_dir};

fn record_graded_assessment(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id_prefix: &str,
    subject_id: &str,
    student_id: &str,
    trimester: i64,
    score: f64,
) {
    let assessment = request_ok(
        stdin,
        reader,
        &format!("{}-a", id_prefix),
        "assessments.create",
        json!({
            "name": format!("Prova T{}", trimester),
            "subjectId": subject_id,
            "trimester": trimester,
            "type": "exam",
            "maxScore": 100.0,
            "weight": 1.0,
            "date": format!("2025-0{}-10", trimester)
        }),
    );
    let assessment_id = assessment["assessment"]["id"].as_str().expect("id").to_string();
    let _ = request_ok(
        stdin,
        reader,
        &format!("{}-g", id_prefix),
        "grades.record",
        json!({
            "studentId": student_id,
            "assessmentId": assessment_id,
            "score": score
        }),
    );
}

fn seed_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    class_name: &str,
    subject_name: &str,
    student_name: &str,
) -> (String, String) {
    let class = request_ok(
        stdin,
        reader,
        "c1",
        "classes.create",
        json!({ "name": class_name, "grade": "10", "year": 2025 }),
    );
    let class_id = class["class"]["id"].as_str().expect("id").to_string();
    let subject = request_ok(
        stdin,
        reader,
        "c2",
        "subjects.create",
        json!({
            "name": subject_name,
            "code": format!("{}-10", subject_name),
            "classId": class_id
        }),
    );
    let subject_id = subject["subject"]["id"].as_str().expect("id").to_string();
    let student = request_ok(
        stdin,
        reader,
        "c3",
        "students.create",
        json!({
            "name": student_name,
            "email": "trend@school.test",
            "processNumber": "TR-1",
            "classId": class_id
        }),
    );
    let student_id = student["student"]["id"].as_str().expect("id").to_string();
    (subject_id, student_id)
}

#[test]
fn performance_trend_rises_with_later_trimesters() {
    let workspace = temp_dir("schoolhub-trend-up");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let (subject_id, student_id) =
        seed_student(&mut stdin, &mut reader, "Turma 10A", "História", "Daniel Vaz");

    record_graded_assessment(&mut stdin, &mut reader, "t1", &subject_id, &student_id, 1, 70.0);
    record_graded_assessment(&mut stdin, &mut reader, "t2", &subject_id, &student_id, 2, 85.0);

    let trend = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "analytics.performanceTrend",
        json!({ "studentId": student_id, "subjectId": subject_id }),
    );
    assert_eq!(trend["trend"], json!("up"));

    let rows = trend["trimesters"].as_array().expect("rows");
    assert_eq!(rows.len(), 3, "always three trimester rows");
    assert_eq!(rows[0]["trimester"], json!(1));
    assert_eq!(rows[0]["gradeCount"], json!(1));
    assert_eq!(rows[0]["average"].as_f64(), Some(70.0));
    assert_eq!(rows[1]["average"].as_f64(), Some(85.0));
    // Trimester 3 has no grades yet.
    assert_eq!(rows[2]["average"], json!(null));
    assert_eq!(rows[2]["gradeCount"], json!(0));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn performance_trend_single_trimester_is_stable() {
    let workspace = temp_dir("schoolhub-trend-stable");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let (subject_id, student_id) =
        seed_student(&mut stdin, &mut reader, "Turma 10B", "Geografia", "Eva Pinto");

    record_graded_assessment(&mut stdin, &mut reader, "t2", &subject_id, &student_id, 2, 91.0);

    // One graded trimester cannot establish a direction. The subject
    // filter stays optional.
    let trend = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "analytics.performanceTrend",
        json!({ "studentId": student_id }),
    );
    assert_eq!(trend["trend"], json!("stable"));
    let rows = trend["trimesters"].as_array().expect("rows");
    assert_eq!(rows[1]["average"].as_f64(), Some(91.0));
    assert_eq!(rows[0]["average"], json!(null));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn performance_trend_detects_decline() {
    let workspace = temp_dir("schoolhub-trend-down");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let (subject_id, student_id) =
        seed_student(&mut stdin, &mut reader, "Turma 10C", "Química", "Rita Gomes");

    record_graded_assessment(&mut stdin, &mut reader, "t1", &subject_id, &student_id, 1, 88.0);
    record_graded_assessment(&mut stdin, &mut reader, "t2", &subject_id, &student_id, 2, 79.0);
    // Within one point of the previous trimester would still be stable;
    // nine points down is a real decline.
    let trend = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "analytics.performanceTrend",
        json!({ "studentId": student_id, "subjectId": subject_id }),
    );
    assert_eq!(trend["trend"], json!("down"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
