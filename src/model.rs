use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub year: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub class_id: String,
    pub teacher_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Inactive,
    Transferred,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Transferred => "transferred",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(StudentStatus::Active),
            "inactive" => Some(StudentStatus::Inactive),
            "transferred" => Some(StudentStatus::Transferred),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub process_number: String,
    pub birth_date: Option<String>,
    pub class_id: String,
    pub guardian_id: Option<String>,
    pub status: StudentStatus,
    pub enrollment_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    Active,
    Inactive,
}

impl TeacherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeacherStatus::Active => "active",
            TeacherStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TeacherStatus::Active),
            "inactive" => Some(TeacherStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub hire_date: String,
    pub status: TeacherStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
    pub process_number: String,
    pub username: Option<String>,
    // Only the SHA-256 digest is persisted; never echo it to clients.
    #[serde(skip_serializing)]
    pub password_digest: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Test,
    Exam,
    Assignment,
    Project,
    Quiz,
}

impl AssessmentKind {
    pub const ALL: [AssessmentKind; 5] = [
        AssessmentKind::Test,
        AssessmentKind::Exam,
        AssessmentKind::Assignment,
        AssessmentKind::Project,
        AssessmentKind::Quiz,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::Test => "test",
            AssessmentKind::Exam => "exam",
            AssessmentKind::Assignment => "assignment",
            AssessmentKind::Project => "project",
            AssessmentKind::Quiz => "quiz",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "test" => Some(AssessmentKind::Test),
            "exam" => Some(AssessmentKind::Exam),
            "assignment" => Some(AssessmentKind::Assignment),
            "project" => Some(AssessmentKind::Project),
            "quiz" => Some(AssessmentKind::Quiz),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub name: String,
    pub subject_id: String,
    pub class_id: String,
    pub trimester: i64,
    #[serde(rename = "type")]
    pub kind: AssessmentKind,
    pub max_score: f64,
    pub weight: f64,
    pub date: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    pub student_id: String,
    pub assessment_id: String,
    pub score: f64,
    pub submitted_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Presente,
    Falta,
    Justificado,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Presente => "presente",
            AttendanceStatus::Falta => "falta",
            AttendanceStatus::Justificado => "justificado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "presente" => Some(AttendanceStatus::Presente),
            "falta" => Some(AttendanceStatus::Falta),
            "justificado" => Some(AttendanceStatus::Justificado),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub subject_id: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAttendanceRecord {
    pub id: String,
    pub teacher_id: String,
    pub date: String,
    pub status: AttendanceStatus,
}
