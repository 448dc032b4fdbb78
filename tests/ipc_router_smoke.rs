use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoolhubd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoolhubd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

fn result_str(value: &serde_json::Value, path: &[&str]) -> String {
    let mut cur = value.get("result").expect("result");
    for key in path {
        cur = cur.get(key).unwrap_or_else(|| panic!("missing {}", key));
    }
    cur.as_str().expect("string field").to_string()
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("schoolhub-router-smoke");
    let csv_out = workspace.join("smoke-export.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["result"]["version"].is_string());
    assert!(health["result"]["workspacePath"].is_null());

    // Store-backed methods refuse to run before a workspace is selected.
    let early = request(&mut stdin, &mut reader, "1b", "classes.list", json!({}));
    assert_eq!(early["ok"], json!(false));
    assert_eq!(early["error"]["code"], json!("no_workspace"));

    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request(
        &mut stdin,
        &mut reader,
        "3",
        "classes.create",
        json!({ "name": "Turma 7A", "grade": "7", "year": 2025 }),
    );
    let class_id = result_str(&created, &["class", "id"]);
    let _ = request(&mut stdin, &mut reader, "4", "classes.list", json!({}));

    let teacher = request(
        &mut stdin,
        &mut reader,
        "5",
        "teachers.create",
        json!({
            "name": "Carlos Mendes",
            "email": "carlos@school.test",
            "phone": "+244 900 000 001"
        }),
    );
    let teacher_id = result_str(&teacher, &["teacher", "id"]);

    let subject = request(
        &mut stdin,
        &mut reader,
        "6",
        "subjects.create",
        json!({
            "name": "Matemática",
            "code": "MAT-7A",
            "classId": class_id,
            "teacherId": teacher_id
        }),
    );
    let subject_id = result_str(&subject, &["subject", "id"]);

    let guardian = request(
        &mut stdin,
        &mut reader,
        "7",
        "guardians.create",
        json!({
            "name": "Maria Silva",
            "email": "maria@family.test",
            "phone": "+244 900 000 002",
            "relationship": "mother",
            "processNumber": "2024001"
        }),
    );
    let guardian_id = result_str(&guardian, &["guardian", "id"]);
    let _ = request(
        &mut stdin,
        &mut reader,
        "7b",
        "guardians.generateCredentials",
        json!({ "guardianId": guardian_id }),
    );

    let student = request(
        &mut stdin,
        &mut reader,
        "8",
        "students.create",
        json!({
            "name": "Ana Silva",
            "email": "ana@school.test",
            "processNumber": "2024001",
            "classId": class_id,
            "guardianId": guardian_id
        }),
    );
    let student_id = result_str(&student, &["student", "id"]);
    let _ = request(
        &mut stdin,
        &mut reader,
        "8b",
        "students.list",
        json!({ "classId": class_id }),
    );

    let assessment = request(
        &mut stdin,
        &mut reader,
        "9",
        "assessments.create",
        json!({
            "name": "Teste 1",
            "subjectId": subject_id,
            "trimester": 1,
            "type": "test",
            "maxScore": 100.0,
            "weight": 1.0,
            "date": "2025-03-10"
        }),
    );
    let assessment_id = result_str(&assessment, &["assessment", "id"]);

    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "grades.record",
        json!({
            "studentId": student_id,
            "assessmentId": assessment_id,
            "score": 87.0
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "11",
        "attendance.record",
        json!({
            "studentId": student_id,
            "subjectId": subject_id,
            "date": "2025-03-10",
            "status": "presente"
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "11b",
        "attendance.recordTeacher",
        json!({
            "teacherId": teacher_id,
            "date": "2025-03-10",
            "status": "presente"
        }),
    );

    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "analytics.studentAverage",
        json!({ "studentId": student_id, "subjectId": subject_id, "trimester": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "13",
        "analytics.classStats",
        json!({ "classId": class_id, "subjectId": subject_id, "trimester": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "14",
        "reports.reportCard",
        json!({ "studentId": student_id, "trimester": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "15",
        "reports.bulletinHtml",
        json!({ "studentId": student_id }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "16",
        "dashboard.adminStats",
        json!({}),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "17",
        "attendance.studentSummary",
        json!({ "studentId": student_id }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "18",
        "export.gradesCsv",
        json!({ "classId": class_id, "outPath": csv_out.to_string_lossy() }),
    );
    assert!(csv_out.exists());

    let deleted = request(
        &mut stdin,
        &mut reader,
        "19",
        "classes.delete",
        json!({ "classId": class_id }),
    );
    assert_eq!(deleted["result"]["ok"], json!(true));

    // Unknown methods fall through every family to not_implemented.
    let payload = json!({ "id": "20", "method": "classes.rename", "params": {} });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let resp: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(resp["error"]["code"], json!("not_implemented"));

    // A line that is not JSON gets an id-less bad_json reply.
    writeln!(stdin, "this is not json").expect("write junk");
    stdin.flush().expect("flush junk");
    let mut junk_line = String::new();
    reader.read_line(&mut junk_line).expect("read junk response");
    let junk: serde_json::Value =
        serde_json::from_str(junk_line.trim()).expect("parse junk response");
    assert_eq!(junk["error"]["code"], json!("bad_json"));
    assert!(junk.get("id").is_none());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
