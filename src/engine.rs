use serde::Serialize;

use crate::model::{Assessment, AssessmentKind, AttendanceStatus, Grade, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GradeLevel {
    A,
    B,
    C,
    D,
    F,
}

impl GradeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLevel::A => "A",
            GradeLevel::B => "B",
            GradeLevel::C => "C",
            GradeLevel::D => "D",
            GradeLevel::F => "F",
        }
    }
}

/// Letter bucket for a percentage average. Boundaries sit at 90/80/70/60.
pub fn grade_level(average: f64) -> GradeLevel {
    if average >= 90.0 {
        GradeLevel::A
    } else if average >= 80.0 {
        GradeLevel::B
    } else if average >= 70.0 {
        GradeLevel::C
    } else if average >= 60.0 {
        GradeLevel::D
    } else {
        GradeLevel::F
    }
}

pub fn grade_percentage(score: f64, max_score: f64) -> f64 {
    if max_score > 0.0 {
        score / max_score * 100.0
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Weighted average percentage for one student in one subject/trimester.
/// `None` means nothing was graded; a recorded zero still counts as data.
pub fn student_average(
    student_id: &str,
    subject_id: &str,
    trimester: i64,
    assessments: &[Assessment],
    grades: &[Grade],
) -> Option<f64> {
    let mut weighted_sum = 0.0_f64;
    let mut total_weight = 0.0_f64;

    for assessment in assessments
        .iter()
        .filter(|a| a.subject_id == subject_id && a.trimester == trimester)
    {
        let Some(grade) = grades
            .iter()
            .find(|g| g.assessment_id == assessment.id && g.student_id == student_id)
        else {
            continue;
        };
        let percentage = grade_percentage(grade.score, assessment.max_score);
        weighted_sum += percentage * assessment.weight;
        total_weight += assessment.weight;
    }

    if total_weight > 0.0 {
        Some(weighted_sum / total_weight)
    } else {
        None
    }
}

/// Unweighted mean of the per-student averages that have data.
pub fn class_average(
    class_id: &str,
    subject_id: &str,
    trimester: i64,
    students: &[Student],
    assessments: &[Assessment],
    grades: &[Grade],
) -> Option<f64> {
    let averages: Vec<f64> = students
        .iter()
        .filter(|s| s.class_id == class_id)
        .filter_map(|s| student_average(&s.id, subject_id, trimester, assessments, grades))
        .collect();
    mean(&averages)
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BelowAverageStats {
    pub count: usize,
    pub percentage: f64,
    pub total: usize,
}

/// Students strictly below the class average. A student with no graded
/// work is not "below", it simply has no data.
pub fn below_average_stats(
    class_id: &str,
    subject_id: &str,
    trimester: i64,
    students: &[Student],
    assessments: &[Assessment],
    grades: &[Grade],
) -> BelowAverageStats {
    let class_students: Vec<&Student> =
        students.iter().filter(|s| s.class_id == class_id).collect();
    let total = class_students.len();
    if total == 0 {
        return BelowAverageStats {
            count: 0,
            percentage: 0.0,
            total: 0,
        };
    }

    let Some(class_avg) = class_average(class_id, subject_id, trimester, students, assessments, grades)
    else {
        return BelowAverageStats {
            count: 0,
            percentage: 0.0,
            total,
        };
    };

    let count = class_students
        .iter()
        .filter_map(|s| student_average(&s.id, subject_id, trimester, assessments, grades))
        .filter(|avg| *avg < class_avg)
        .count();

    BelowAverageStats {
        count,
        percentage: count as f64 / total as f64 * 100.0,
        total,
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
    #[serde(rename = "D")]
    pub d: usize,
    #[serde(rename = "F")]
    pub f: usize,
}

pub fn grade_distribution(
    class_id: &str,
    subject_id: &str,
    trimester: i64,
    students: &[Student],
    assessments: &[Assessment],
    grades: &[Grade],
) -> GradeDistribution {
    let mut dist = GradeDistribution::default();
    for student in students.iter().filter(|s| s.class_id == class_id) {
        let Some(average) = student_average(&student.id, subject_id, trimester, assessments, grades)
        else {
            continue;
        };
        match grade_level(average) {
            GradeLevel::A => dist.a += 1,
            GradeLevel::B => dist.b += 1,
            GradeLevel::C => dist.c += 1,
            GradeLevel::D => dist.d += 1,
            GradeLevel::F => dist.f += 1,
        }
    }
    dist
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TypeBreakdown {
    pub test: Option<f64>,
    pub exam: Option<f64>,
    pub assignment: Option<f64>,
    pub project: Option<f64>,
    pub quiz: Option<f64>,
}

/// Per assessment type: the mean of per-assessment mean percentages,
/// so one heavily-graded assessment does not drown out the others.
pub fn performance_by_type(
    subject_id: &str,
    trimester: i64,
    assessments: &[Assessment],
    grades: &[Grade],
) -> TypeBreakdown {
    let kind_average = |kind: AssessmentKind| -> Option<f64> {
        let per_assessment: Vec<f64> = assessments
            .iter()
            .filter(|a| a.subject_id == subject_id && a.trimester == trimester && a.kind == kind)
            .filter_map(|a| {
                let percentages: Vec<f64> = grades
                    .iter()
                    .filter(|g| g.assessment_id == a.id)
                    .map(|g| grade_percentage(g.score, a.max_score))
                    .collect();
                mean(&percentages)
            })
            .collect();
        mean(&per_assessment)
    };

    TypeBreakdown {
        test: kind_average(AssessmentKind::Test),
        exam: kind_average(AssessmentKind::Exam),
        assignment: kind_average(AssessmentKind::Assignment),
        project: kind_average(AssessmentKind::Project),
        quiz: kind_average(AssessmentKind::Quiz),
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimesterAverage {
    pub trimester: i64,
    pub average: Option<f64>,
    pub grade_count: usize,
}

/// Unweighted mean grade percentage per trimester for one student,
/// optionally narrowed to a single subject.
pub fn trimester_breakdown(
    student_id: &str,
    subject_id: Option<&str>,
    assessments: &[Assessment],
    grades: &[Grade],
) -> Vec<TrimesterAverage> {
    (1..=3)
        .map(|trimester| {
            let percentages: Vec<f64> = grades
                .iter()
                .filter(|g| g.student_id == student_id)
                .filter_map(|g| {
                    let assessment = assessments.iter().find(|a| a.id == g.assessment_id)?;
                    if assessment.trimester != trimester {
                        return None;
                    }
                    if let Some(subject_id) = subject_id {
                        if assessment.subject_id != subject_id {
                            return None;
                        }
                    }
                    Some(grade_percentage(g.score, assessment.max_score))
                })
                .collect();
            TrimesterAverage {
                trimester,
                average: mean(&percentages),
                grade_count: percentages.len(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Compares the last two trimesters that have grades; a swing of more
/// than one percentage point counts as movement.
pub fn performance_trend(rows: &[TrimesterAverage]) -> Trend {
    let with_data: Vec<&TrimesterAverage> =
        rows.iter().filter(|r| r.grade_count > 0).collect();
    if with_data.len() < 2 {
        return Trend::Stable;
    }
    let prev = with_data[with_data.len() - 2].average.unwrap_or(0.0);
    let last = with_data[with_data.len() - 1].average.unwrap_or(0.0);
    let diff = last - prev;
    if diff > 1.0 {
        Trend::Up
    } else if diff < -1.0 {
        Trend::Down
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total: usize,
    pub presente: usize,
    pub falta: usize,
    pub justificado: usize,
    pub presence_rate: Option<f64>,
}

pub fn attendance_summary(statuses: &[AttendanceStatus]) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        total: statuses.len(),
        presente: 0,
        falta: 0,
        justificado: 0,
        presence_rate: None,
    };
    for status in statuses {
        match status {
            AttendanceStatus::Presente => summary.presente += 1,
            AttendanceStatus::Falta => summary.falta += 1,
            AttendanceStatus::Justificado => summary.justificado += 1,
        }
    }
    if summary.total > 0 {
        summary.presence_rate = Some(summary.presente as f64 / summary.total as f64 * 100.0);
    }
    summary
}
