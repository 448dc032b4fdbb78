use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::{self, GradeLevel};
use crate::model::{Assessment, AttendanceStatus, Grade, Student, Subject};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentLine {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectReport {
    pub subject: Subject,
    pub average: Option<f64>,
    pub grade_level: Option<GradeLevel>,
    pub assessments: Vec<AssessmentLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub student: Student,
    pub trimester: i64,
    pub subjects: Vec<SubjectReport>,
    pub overall_average: Option<f64>,
    pub overall_grade_level: Option<GradeLevel>,
    pub observations: String,
}

/// Builds the report card for one student and trimester. `subjects`
/// must already be scoped to the student's class. Subjects without a
/// positive average are kept in the list but excluded from the overall.
pub fn build_report_card(
    student: &Student,
    trimester: i64,
    subjects: &[Subject],
    assessments: &[Assessment],
    grades: &[Grade],
) -> ReportCard {
    let subject_reports: Vec<SubjectReport> = subjects
        .iter()
        .map(|subject| {
            let average =
                engine::student_average(&student.id, &subject.id, trimester, assessments, grades);
            let lines: Vec<AssessmentLine> = assessments
                .iter()
                .filter(|a| a.subject_id == subject.id && a.trimester == trimester)
                .filter_map(|a| {
                    let grade = grades
                        .iter()
                        .find(|g| g.assessment_id == a.id && g.student_id == student.id)?;
                    if grade.score > 0.0 {
                        Some(AssessmentLine {
                            name: a.name.clone(),
                            score: grade.score,
                            max_score: a.max_score,
                            kind: a.kind.as_str().to_string(),
                        })
                    } else {
                        None
                    }
                })
                .collect();
            SubjectReport {
                subject: subject.clone(),
                average,
                grade_level: average.map(engine::grade_level),
                assessments: lines,
            }
        })
        .collect();

    let positives: Vec<f64> = subject_reports
        .iter()
        .filter_map(|s| s.average.filter(|v| *v > 0.0))
        .collect();
    let overall_average = engine::mean(&positives);

    ReportCard {
        student: student.clone(),
        trimester,
        subjects: subject_reports,
        overall_average,
        overall_grade_level: overall_average.map(engine::grade_level),
        observations: observation_for(overall_average.unwrap_or(0.0)).to_string(),
    }
}

fn observation_for(overall_average: f64) -> &'static str {
    if overall_average >= 90.0 {
        "Excellent performance! Keep up the outstanding work."
    } else if overall_average >= 80.0 {
        "Very good performance. Continue working hard."
    } else if overall_average >= 70.0 {
        "Good performance. There is room for improvement in some areas."
    } else if overall_average >= 60.0 {
        "Satisfactory performance. Additional support may be beneficial."
    } else {
        "Performance needs improvement. Please schedule a meeting with teachers."
    }
}

/// ISO date to DD/MM/YYYY for rendered documents. Unparseable input is
/// passed through untouched.
pub fn display_date(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

fn fmt_avg(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "0".to_string(),
    }
}

fn fmt_rate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "0".to_string(),
    }
}

/// Inline-styled HTML email body for a report card, suitable for mail
/// clients that strip stylesheets.
pub fn render_report_email(card: &ReportCard, school_name: &str) -> String {
    let subject_rows: String = card
        .subjects
        .iter()
        .filter(|s| s.average.is_some_and(|v| v > 0.0))
        .map(|s| {
            format!(
                concat!(
                    "\n    <tr>\n",
                    "      <td style=\"padding: 12px; border-bottom: 1px solid #e5e7eb;\">{name}</td>\n",
                    "      <td style=\"padding: 12px; border-bottom: 1px solid #e5e7eb; text-align: center;\">{average}%</td>\n",
                    "      <td style=\"padding: 12px; border-bottom: 1px solid #e5e7eb; text-align: center; font-weight: bold;\">{level}</td>\n",
                    "    </tr>\n  "
                ),
                name = s.subject.name,
                average = fmt_avg(s.average),
                level = s.grade_level.map_or("F", |g| g.as_str()),
            )
        })
        .collect();

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n",
            "<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <title>Report Card - {student_name}</title>\n",
            "</head>\n",
            "<body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;\">\n",
            "  <div style=\"background-color: #3b82f6; color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0;\">\n",
            "    <h1 style=\"margin: 0;\">{school}</h1>\n",
            "    <p style=\"margin: 5px 0 0 0;\">Report Card - Trimester {trimester}</p>\n",
            "  </div>\n",
            "  <div style=\"background-color: #f9fafb; padding: 20px; border: 1px solid #e5e7eb; border-top: none;\">\n",
            "    <h2 style=\"color: #1f2937; margin-top: 0;\">Student Information</h2>\n",
            "    <p><strong>Name:</strong> {student_name}</p>\n",
            "    <p><strong>Email:</strong> {student_email}</p>\n",
            "    <p><strong>Enrollment Date:</strong> {enrollment}</p>\n",
            "  </div>\n",
            "  <div style=\"padding: 20px; border: 1px solid #e5e7eb; border-top: none;\">\n",
            "    <h2 style=\"color: #1f2937;\">Academic Performance</h2>\n",
            "    <table style=\"width: 100%; border-collapse: collapse;\">\n",
            "      <thead>\n",
            "        <tr style=\"background-color: #f3f4f6;\">\n",
            "          <th style=\"padding: 12px; text-align: left; border-bottom: 2px solid #e5e7eb;\">Subject</th>\n",
            "          <th style=\"padding: 12px; text-align: center; border-bottom: 2px solid #e5e7eb;\">Average</th>\n",
            "          <th style=\"padding: 12px; text-align: center; border-bottom: 2px solid #e5e7eb;\">Grade</th>\n",
            "        </tr>\n",
            "      </thead>\n",
            "      <tbody>\n",
            "        {subject_rows}\n",
            "      </tbody>\n",
            "    </table>\n",
            "    <div style=\"margin-top: 20px; padding: 15px; background-color: #eff6ff; border-left: 4px solid #3b82f6;\">\n",
            "      <p style=\"margin: 0;\"><strong>Overall Average:</strong> {overall}%</p>\n",
            "      <p style=\"margin: 5px 0 0 0;\"><strong>Overall Grade:</strong> {overall_level}</p>\n",
            "    </div>\n",
            "  </div>\n",
            "  <div style=\"padding: 20px; border: 1px solid #e5e7eb; border-top: none;\">\n",
            "    <h2 style=\"color: #1f2937;\">Observations</h2>\n",
            "    <p>{observations}</p>\n",
            "  </div>\n",
            "  <div style=\"background-color: #f9fafb; padding: 20px; text-align: center; border: 1px solid #e5e7eb; border-top: none; border-radius: 0 0 8px 8px;\">\n",
            "    <p style=\"margin: 0; color: #6b7280; font-size: 14px;\">\n",
            "      {school} - School Management System<br>\n",
            "      This is an automated report card notification.\n",
            "    </p>\n",
            "  </div>\n",
            "</body>\n",
            "</html>\n"
        ),
        student_name = card.student.name,
        student_email = card.student.email,
        enrollment = display_date(&card.student.enrollment_date),
        school = school_name,
        trimester = card.trimester,
        subject_rows = subject_rows,
        overall = fmt_avg(card.overall_average),
        overall_level = card.overall_grade_level.map_or("F", |g| g.as_str()),
        observations = card.observations,
    )
}

#[derive(Debug, Clone)]
pub struct BulletinGradeLine {
    pub subject_name: String,
    pub score: f64,
    pub max_score: f64,
    pub kind: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct BulletinAttendanceLine {
    pub subject_name: String,
    pub date: String,
    pub status: AttendanceStatus,
}

const BULLETIN_STYLE: &str = "* { margin: 0; padding: 0; box-sizing: border-box; } \
body { font-family: Arial, sans-serif; color: #333; line-height: 1.6; } \
.container { max-width: 800px; margin: 0 auto; padding: 20px; } \
.header { text-align: center; border-bottom: 3px solid #1e40af; padding-bottom: 15px; margin-bottom: 20px; } \
.header h1 { color: #1e40af; font-size: 24px; margin-bottom: 5px; } \
.header p { color: #666; font-size: 14px; } \
.student-info { background: #f0f4f8; padding: 15px; border-radius: 8px; margin-bottom: 20px; } \
.student-info h2 { color: #1e40af; font-size: 16px; margin-bottom: 10px; } \
.info-row { display: flex; justify-content: space-between; margin-bottom: 5px; font-size: 14px; } \
.section { margin-bottom: 25px; } \
.section h3 { color: #1e40af; border-bottom: 2px solid #1e40af; padding-bottom: 8px; margin-bottom: 12px; font-size: 16px; } \
table { width: 100%; border-collapse: collapse; margin-top: 10px; } \
th { background: #1e40af; color: white; padding: 10px; text-align: left; font-weight: bold; } \
td { padding: 10px; border-bottom: 1px solid #ddd; font-size: 14px; } \
tr:last-child td { border-bottom: 2px solid #1e40af; } \
.stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 15px; margin-top: 15px; } \
.stat-card { background: #f0f4f8; padding: 15px; border-radius: 8px; text-align: center; } \
.stat-value { font-size: 24px; font-weight: bold; color: #1e40af; } \
.stat-label { color: #666; font-size: 12px; margin-top: 5px; } \
.footer { text-align: center; border-top: 1px solid #ddd; padding-top: 15px; margin-top: 25px; font-size: 12px; color: #666; }";

/// Printable school bulletin: header, student info, three stat cards,
/// the full grade table, and the ten most recent attendance rows.
pub fn render_bulletin(
    student: &Student,
    class_name: Option<&str>,
    grades: &[BulletinGradeLine],
    attendance: &[BulletinAttendanceLine],
) -> String {
    let percentages: Vec<f64> = grades
        .iter()
        .map(|g| engine::grade_percentage(g.score, g.max_score))
        .collect();
    let average = engine::mean(&percentages);

    let presence_rate = if attendance.is_empty() {
        None
    } else {
        let present = attendance
            .iter()
            .filter(|a| a.status == AttendanceStatus::Presente)
            .count();
        Some(present as f64 / attendance.len() as f64 * 100.0)
    };

    let grade_rows: String = grades
        .iter()
        .map(|g| {
            format!(
                "<tr><td>{}</td><td><strong>{}/{}</strong></td><td>{}</td><td>{}</td></tr>",
                g.subject_name,
                g.score,
                g.max_score,
                g.kind,
                display_date(&g.date)
            )
        })
        .collect();

    let attendance_rows: String = attendance
        .iter()
        .take(10)
        .map(|a| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                a.subject_name,
                display_date(&a.date),
                a.status.as_str()
            )
        })
        .collect();

    let now = chrono::Local::now();

    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"pt\"><head><meta charset=\"UTF-8\">",
            "<title>Boletim de {name}</title><style>{style}</style></head>",
            "<body><div class=\"container\">",
            "<div class=\"header\"><h1>BOLETIM ESCOLAR</h1><p>Sistema de Gestão Escolar</p></div>",
            "<div class=\"student-info\"><h2>Informações do Aluno</h2>",
            "<div class=\"info-row\"><strong>Nome:</strong> {name}</div>",
            "<div class=\"info-row\"><strong>Turma:</strong> {class_name}</div>",
            "<div class=\"info-row\"><strong>Data de Nascimento:</strong> {birth_date}</div></div>",
            "<div class=\"stats\">",
            "<div class=\"stat-card\"><div class=\"stat-value\">{average}%</div><div class=\"stat-label\">Média Geral</div></div>",
            "<div class=\"stat-card\"><div class=\"stat-value\">{grade_count}</div><div class=\"stat-label\">Avaliações</div></div>",
            "<div class=\"stat-card\"><div class=\"stat-value\">{presence}%</div><div class=\"stat-label\">Presença</div></div>",
            "</div>",
            "<div class=\"section\"><h3>Desempenho por Disciplina</h3>",
            "<table><thead><tr><th>Disciplina</th><th>Nota</th><th>Tipo</th><th>Data</th></tr></thead>",
            "<tbody>{grade_rows}</tbody></table></div>",
            "<div class=\"section\"><h3>Resumo de Presença</h3>",
            "<table><thead><tr><th>Disciplina</th><th>Data</th><th>Status</th></tr></thead>",
            "<tbody>{attendance_rows}</tbody></table></div>",
            "<div class=\"footer\"><p>Documento gerado em {gen_date} às {gen_time}</p></div>",
            "</div></body></html>"
        ),
        name = student.name,
        style = BULLETIN_STYLE,
        class_name = class_name.unwrap_or("N/A"),
        birth_date = student.birth_date.as_deref().map_or_else(|| "N/A".to_string(), display_date),
        average = fmt_avg(average),
        grade_count = grades.len(),
        presence = fmt_rate(presence_rate),
        grade_rows = grade_rows,
        attendance_rows = attendance_rows,
        gen_date = now.format("%d/%m/%Y"),
        gen_time = now.format("%H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentKind, StudentStatus};

    fn student() -> Student {
        Student {
            id: "s1".to_string(),
            name: "Ana Silva".to_string(),
            email: "ana@school.test".to_string(),
            process_number: "2024001".to_string(),
            birth_date: Some("2010-05-20".to_string()),
            class_id: "c1".to_string(),
            guardian_id: None,
            status: StudentStatus::Active,
            enrollment_date: "2024-09-01".to_string(),
        }
    }

    fn subject(id: &str, name: &str) -> Subject {
        Subject {
            id: id.to_string(),
            name: name.to_string(),
            code: format!("{}-01", name),
            description: None,
            class_id: "c1".to_string(),
            teacher_id: None,
            created_at: "2024-09-01T00:00:00Z".to_string(),
        }
    }

    fn assessment(id: &str, subject_id: &str, max_score: f64, weight: f64) -> Assessment {
        Assessment {
            id: id.to_string(),
            name: format!("Assessment {}", id),
            subject_id: subject_id.to_string(),
            class_id: "c1".to_string(),
            trimester: 1,
            kind: AssessmentKind::Test,
            max_score,
            weight,
            date: "2025-03-15".to_string(),
            created_at: "2025-03-01T00:00:00Z".to_string(),
        }
    }

    fn grade(assessment_id: &str, score: f64) -> Grade {
        Grade {
            id: format!("g-{}", assessment_id),
            student_id: "s1".to_string(),
            assessment_id: assessment_id.to_string(),
            score,
            submitted_at: None,
            notes: None,
        }
    }

    #[test]
    fn observation_bands() {
        assert_eq!(
            observation_for(92.0),
            "Excellent performance! Keep up the outstanding work."
        );
        assert_eq!(
            observation_for(85.0),
            "Very good performance. Continue working hard."
        );
        assert_eq!(
            observation_for(72.5),
            "Good performance. There is room for improvement in some areas."
        );
        assert_eq!(
            observation_for(60.0),
            "Satisfactory performance. Additional support may be beneficial."
        );
        assert_eq!(
            observation_for(40.0),
            "Performance needs improvement. Please schedule a meeting with teachers."
        );
    }

    #[test]
    fn report_card_keeps_ungraded_subjects_out_of_overall() {
        let subjects = vec![subject("sub1", "Math"), subject("sub2", "History")];
        let assessments = vec![
            assessment("a1", "sub1", 100.0, 1.0),
            assessment("a2", "sub2", 100.0, 1.0),
        ];
        let grades = vec![grade("a1", 88.0)];

        let card = build_report_card(&student(), 1, &subjects, &assessments, &grades);
        assert_eq!(card.subjects.len(), 2);
        assert_eq!(card.subjects[0].average, Some(88.0));
        assert_eq!(card.subjects[0].grade_level, Some(GradeLevel::B));
        assert_eq!(card.subjects[1].average, None);
        assert_eq!(card.subjects[1].grade_level, None);
        assert_eq!(card.overall_average, Some(88.0));
        assert_eq!(card.overall_grade_level, Some(GradeLevel::B));
        assert_eq!(
            card.observations,
            "Very good performance. Continue working hard."
        );
    }

    #[test]
    fn report_card_drops_zero_score_assessment_lines() {
        let subjects = vec![subject("sub1", "Math")];
        let assessments = vec![
            assessment("a1", "sub1", 100.0, 1.0),
            assessment("a2", "sub1", 100.0, 1.0),
        ];
        let grades = vec![grade("a1", 75.0), grade("a2", 0.0)];

        let card = build_report_card(&student(), 1, &subjects, &assessments, &grades);
        assert_eq!(card.subjects[0].assessments.len(), 1);
        assert_eq!(card.subjects[0].assessments[0].name, "Assessment a1");
        // The zero still drags the weighted average down.
        assert_eq!(card.subjects[0].average, Some(37.5));
    }

    #[test]
    fn report_card_without_any_grades() {
        let subjects = vec![subject("sub1", "Math")];
        let card = build_report_card(&student(), 1, &subjects, &[], &[]);
        assert_eq!(card.overall_average, None);
        assert_eq!(card.overall_grade_level, None);
        assert_eq!(
            card.observations,
            "Performance needs improvement. Please schedule a meeting with teachers."
        );
    }

    #[test]
    fn email_lists_only_subjects_with_positive_averages() {
        let subjects = vec![subject("sub1", "Math"), subject("sub2", "History")];
        let assessments = vec![assessment("a1", "sub1", 100.0, 1.0)];
        let grades = vec![grade("a1", 87.0)];

        let card = build_report_card(&student(), 1, &subjects, &assessments, &grades);
        let html = render_report_email(&card, "SchoolHub");

        assert!(html.contains("<h1 style=\"margin: 0;\">SchoolHub</h1>"));
        assert!(html.contains("Report Card - Trimester 1"));
        assert!(html.contains("Math"));
        assert!(html.contains("87.00%"));
        assert!(!html.contains("History"));
        assert!(html.contains("<strong>Overall Average:</strong> 87.00%"));
        assert!(html.contains("Enrollment Date:</strong> 01/09/2024"));
    }

    #[test]
    fn bulletin_renders_stats_and_caps_attendance_rows() {
        let grades = vec![
            BulletinGradeLine {
                subject_name: "Math".to_string(),
                score: 8.0,
                max_score: 10.0,
                kind: "test".to_string(),
                date: "2025-02-01".to_string(),
            },
            BulletinGradeLine {
                subject_name: "History".to_string(),
                score: 6.0,
                max_score: 10.0,
                kind: "quiz".to_string(),
                date: "2025-02-02".to_string(),
            },
        ];
        let attendance: Vec<BulletinAttendanceLine> = (1..=12)
            .map(|day| BulletinAttendanceLine {
                subject_name: "Biology".to_string(),
                date: format!("2025-03-{:02}", day),
                status: if day == 1 {
                    AttendanceStatus::Falta
                } else {
                    AttendanceStatus::Presente
                },
            })
            .collect();

        let html = render_bulletin(&student(), Some("7A"), &grades, &attendance);
        assert!(html.contains("BOLETIM ESCOLAR"));
        assert!(html.contains("<strong>Nome:</strong> Ana Silva"));
        assert!(html.contains("<strong>Turma:</strong> 7A"));
        assert!(html.contains("<strong>Data de Nascimento:</strong> 20/05/2010"));
        // (80 + 60) / 2
        assert!(html.contains("70.00%"));
        // 11 of 12 presente
        assert!(html.contains("91.7%"));
        assert!(html.contains("<strong>8/10</strong>"));
        // attendance table is capped at ten rows
        assert_eq!(html.matches("<td>Biology</td>").count(), 10);
    }

    #[test]
    fn bulletin_handles_missing_data() {
        let mut s = student();
        s.birth_date = None;
        let html = render_bulletin(&s, None, &[], &[]);
        assert!(html.contains("<strong>Turma:</strong> N/A"));
        assert!(html.contains("<strong>Data de Nascimento:</strong> N/A"));
        assert!(html.contains("<div class=\"stat-value\">0%</div>"));
    }

    #[test]
    fn display_date_formats_and_falls_back() {
        assert_eq!(display_date("2025-03-15"), "15/03/2025");
        assert_eq!(display_date("not-a-date"), "not-a-date");
    }
}
