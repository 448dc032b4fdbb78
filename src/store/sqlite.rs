use std::path::Path;

use rusqlite::{Connection, Params, Row};

use crate::db;
use crate::model::{
    Assessment, AssessmentKind, AttendanceRecord, AttendanceStatus, Class, Grade, Guardian,
    Student, StudentStatus, Subject, Teacher, TeacherAttendanceRecord, TeacherStatus,
};
use crate::store::{Repository, Scope, Store, StoreError};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(SqliteStore {
            conn: db::open_db(workspace)?,
        })
    }

    fn query_rows<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>, StoreError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql).map_err(StoreError::Query)?;
        let rows = stmt.query_map(params, f).map_err(StoreError::Query)?;
        rows.collect::<rusqlite::Result<Vec<T>>>()
            .map_err(StoreError::Query)
    }

    fn query_row_opt<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>, StoreError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql).map_err(StoreError::Query)?;
        let mut rows = stmt.query_map(params, f).map_err(StoreError::Query)?;
        rows.next().transpose().map_err(StoreError::Query)
    }
}

impl Store for SqliteStore {}

fn bad_text(value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("unrecognized value '{}'", value).into(),
    )
}

fn row_to_class(row: &Row<'_>) -> rusqlite::Result<Class> {
    Ok(Class {
        id: row.get(0)?,
        name: row.get(1)?,
        grade: row.get(2)?,
        year: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
        class_id: row.get(4)?,
        teacher_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn row_to_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    let status: String = row.get(7)?;
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        process_number: row.get(3)?,
        birth_date: row.get(4)?,
        class_id: row.get(5)?,
        guardian_id: row.get(6)?,
        status: StudentStatus::parse(&status).ok_or_else(|| bad_text(&status))?,
        enrollment_date: row.get(8)?,
    })
}

fn row_to_teacher(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    let status: String = row.get(5)?;
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        hire_date: row.get(4)?,
        status: TeacherStatus::parse(&status).ok_or_else(|| bad_text(&status))?,
    })
}

fn row_to_guardian(row: &Row<'_>) -> rusqlite::Result<Guardian> {
    Ok(Guardian {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        relationship: row.get(4)?,
        process_number: row.get(5)?,
        username: row.get(6)?,
        password_digest: row.get(7)?,
    })
}

fn row_to_assessment(row: &Row<'_>) -> rusqlite::Result<Assessment> {
    let kind: String = row.get(5)?;
    Ok(Assessment {
        id: row.get(0)?,
        name: row.get(1)?,
        subject_id: row.get(2)?,
        class_id: row.get(3)?,
        trimester: row.get(4)?,
        kind: AssessmentKind::parse(&kind).ok_or_else(|| bad_text(&kind))?,
        max_score: row.get(6)?,
        weight: row.get(7)?,
        date: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn row_to_grade(row: &Row<'_>) -> rusqlite::Result<Grade> {
    Ok(Grade {
        id: row.get(0)?,
        student_id: row.get(1)?,
        assessment_id: row.get(2)?,
        score: row.get(3)?,
        submitted_at: row.get(4)?,
        notes: row.get(5)?,
    })
}

fn row_to_attendance(row: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    let status: String = row.get(4)?;
    Ok(AttendanceRecord {
        id: row.get(0)?,
        student_id: row.get(1)?,
        subject_id: row.get(2)?,
        date: row.get(3)?,
        status: AttendanceStatus::parse(&status).ok_or_else(|| bad_text(&status))?,
        note: row.get(5)?,
    })
}

fn row_to_teacher_attendance(row: &Row<'_>) -> rusqlite::Result<TeacherAttendanceRecord> {
    let status: String = row.get(3)?;
    Ok(TeacherAttendanceRecord {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        date: row.get(2)?,
        status: AttendanceStatus::parse(&status).ok_or_else(|| bad_text(&status))?,
    })
}

impl Repository<Class> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Class>, StoreError> {
        self.query_row_opt(
            "SELECT id, name, grade, year, created_at FROM classes WHERE id = ?",
            [id],
            row_to_class,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Class>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, name, grade, year, created_at FROM classes ORDER BY name, id",
                [],
                row_to_class,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Class) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO classes(id, name, grade, year, created_at)
                 VALUES(?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET name = ?2, grade = ?3, year = ?4",
                (
                    &record.id,
                    &record.name,
                    &record.grade,
                    record.year,
                    &record.created_at,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Tx)?;
        tx.execute(
            "DELETE FROM grades WHERE assessment_id IN (SELECT id FROM assessments WHERE class_id = ?)",
            [id],
        )
        .map_err(StoreError::Delete)?;
        tx.execute(
            "DELETE FROM grades WHERE student_id IN (SELECT id FROM students WHERE class_id = ?)",
            [id],
        )
        .map_err(StoreError::Delete)?;
        tx.execute(
            "DELETE FROM attendance WHERE subject_id IN (SELECT id FROM subjects WHERE class_id = ?)",
            [id],
        )
        .map_err(StoreError::Delete)?;
        tx.execute(
            "DELETE FROM attendance WHERE student_id IN (SELECT id FROM students WHERE class_id = ?)",
            [id],
        )
        .map_err(StoreError::Delete)?;
        tx.execute("DELETE FROM assessments WHERE class_id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.execute("DELETE FROM students WHERE class_id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.execute("DELETE FROM subjects WHERE class_id = ?", [id])
            .map_err(StoreError::Delete)?;
        let n = tx
            .execute("DELETE FROM classes WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.commit().map_err(StoreError::Commit)?;
        Ok(n > 0)
    }
}

impl Repository<Subject> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Subject>, StoreError> {
        self.query_row_opt(
            "SELECT id, name, code, description, class_id, teacher_id, created_at
             FROM subjects WHERE id = ?",
            [id],
            row_to_subject,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Subject>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, name, code, description, class_id, teacher_id, created_at
                 FROM subjects ORDER BY name, id",
                [],
                row_to_subject,
            ),
            Scope::Class(class_id) => self.query_rows(
                "SELECT id, name, code, description, class_id, teacher_id, created_at
                 FROM subjects WHERE class_id = ? ORDER BY name, id",
                [class_id],
                row_to_subject,
            ),
            Scope::Teacher(teacher_id) => self.query_rows(
                "SELECT id, name, code, description, class_id, teacher_id, created_at
                 FROM subjects WHERE teacher_id = ? ORDER BY name, id",
                [teacher_id],
                row_to_subject,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Subject) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO subjects(id, name, code, description, class_id, teacher_id, created_at)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     name = ?2, code = ?3, description = ?4, class_id = ?5, teacher_id = ?6",
                (
                    &record.id,
                    &record.name,
                    &record.code,
                    &record.description,
                    &record.class_id,
                    &record.teacher_id,
                    &record.created_at,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Tx)?;
        tx.execute(
            "DELETE FROM grades WHERE assessment_id IN (SELECT id FROM assessments WHERE subject_id = ?)",
            [id],
        )
        .map_err(StoreError::Delete)?;
        tx.execute("DELETE FROM attendance WHERE subject_id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.execute("DELETE FROM assessments WHERE subject_id = ?", [id])
            .map_err(StoreError::Delete)?;
        let n = tx
            .execute("DELETE FROM subjects WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.commit().map_err(StoreError::Commit)?;
        Ok(n > 0)
    }
}

impl Repository<Student> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Student>, StoreError> {
        self.query_row_opt(
            "SELECT id, name, email, process_number, birth_date, class_id, guardian_id,
                    status, enrollment_date
             FROM students WHERE id = ?",
            [id],
            row_to_student,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Student>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, name, email, process_number, birth_date, class_id, guardian_id,
                        status, enrollment_date
                 FROM students ORDER BY name, id",
                [],
                row_to_student,
            ),
            Scope::Class(class_id) => self.query_rows(
                "SELECT id, name, email, process_number, birth_date, class_id, guardian_id,
                        status, enrollment_date
                 FROM students WHERE class_id = ? ORDER BY name, id",
                [class_id],
                row_to_student,
            ),
            Scope::Guardian(guardian_id) => self.query_rows(
                "SELECT id, name, email, process_number, birth_date, class_id, guardian_id,
                        status, enrollment_date
                 FROM students WHERE guardian_id = ? ORDER BY name, id",
                [guardian_id],
                row_to_student,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Student) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO students(id, name, email, process_number, birth_date, class_id,
                                      guardian_id, status, enrollment_date)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                     name = ?2, email = ?3, process_number = ?4, birth_date = ?5,
                     class_id = ?6, guardian_id = ?7, status = ?8, enrollment_date = ?9",
                (
                    &record.id,
                    &record.name,
                    &record.email,
                    &record.process_number,
                    &record.birth_date,
                    &record.class_id,
                    &record.guardian_id,
                    record.status.as_str(),
                    &record.enrollment_date,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Tx)?;
        tx.execute("DELETE FROM grades WHERE student_id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.execute("DELETE FROM attendance WHERE student_id = ?", [id])
            .map_err(StoreError::Delete)?;
        let n = tx
            .execute("DELETE FROM students WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.commit().map_err(StoreError::Commit)?;
        Ok(n > 0)
    }
}

impl Repository<Teacher> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, StoreError> {
        self.query_row_opt(
            "SELECT id, name, email, phone, hire_date, status FROM teachers WHERE id = ?",
            [id],
            row_to_teacher,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Teacher>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, name, email, phone, hire_date, status FROM teachers ORDER BY name, id",
                [],
                row_to_teacher,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Teacher) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO teachers(id, name, email, phone, hire_date, status)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     name = ?2, email = ?3, phone = ?4, hire_date = ?5, status = ?6",
                (
                    &record.id,
                    &record.name,
                    &record.email,
                    &record.phone,
                    &record.hire_date,
                    record.status.as_str(),
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Tx)?;
        tx.execute("DELETE FROM teacher_attendance WHERE teacher_id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.execute(
            "UPDATE subjects SET teacher_id = NULL WHERE teacher_id = ?",
            [id],
        )
        .map_err(StoreError::Delete)?;
        let n = tx
            .execute("DELETE FROM teachers WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.commit().map_err(StoreError::Commit)?;
        Ok(n > 0)
    }
}

impl Repository<Guardian> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Guardian>, StoreError> {
        self.query_row_opt(
            "SELECT id, name, email, phone, relationship, process_number, username, password_digest
             FROM guardians WHERE id = ?",
            [id],
            row_to_guardian,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Guardian>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, name, email, phone, relationship, process_number, username, password_digest
                 FROM guardians ORDER BY name, id",
                [],
                row_to_guardian,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Guardian) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO guardians(id, name, email, phone, relationship, process_number,
                                       username, password_digest)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     name = ?2, email = ?3, phone = ?4, relationship = ?5,
                     process_number = ?6, username = ?7, password_digest = ?8",
                (
                    &record.id,
                    &record.name,
                    &record.email,
                    &record.phone,
                    &record.relationship,
                    &record.process_number,
                    &record.username,
                    &record.password_digest,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Tx)?;
        tx.execute(
            "UPDATE students SET guardian_id = NULL WHERE guardian_id = ?",
            [id],
        )
        .map_err(StoreError::Delete)?;
        let n = tx
            .execute("DELETE FROM guardians WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.commit().map_err(StoreError::Commit)?;
        Ok(n > 0)
    }
}

impl Repository<Assessment> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Assessment>, StoreError> {
        self.query_row_opt(
            "SELECT id, name, subject_id, class_id, trimester, kind, max_score, weight,
                    date, created_at
             FROM assessments WHERE id = ?",
            [id],
            row_to_assessment,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Assessment>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, name, subject_id, class_id, trimester, kind, max_score, weight,
                        date, created_at
                 FROM assessments ORDER BY date, id",
                [],
                row_to_assessment,
            ),
            Scope::Subject(subject_id) => self.query_rows(
                "SELECT id, name, subject_id, class_id, trimester, kind, max_score, weight,
                        date, created_at
                 FROM assessments WHERE subject_id = ? ORDER BY date, id",
                [subject_id],
                row_to_assessment,
            ),
            Scope::Class(class_id) => self.query_rows(
                "SELECT id, name, subject_id, class_id, trimester, kind, max_score, weight,
                        date, created_at
                 FROM assessments WHERE class_id = ? ORDER BY date, id",
                [class_id],
                row_to_assessment,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Assessment) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO assessments(id, name, subject_id, class_id, trimester, kind,
                                         max_score, weight, date, created_at)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                     name = ?2, subject_id = ?3, class_id = ?4, trimester = ?5, kind = ?6,
                     max_score = ?7, weight = ?8, date = ?9",
                (
                    &record.id,
                    &record.name,
                    &record.subject_id,
                    &record.class_id,
                    record.trimester,
                    record.kind.as_str(),
                    record.max_score,
                    record.weight,
                    &record.date,
                    &record.created_at,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Tx)?;
        tx.execute("DELETE FROM grades WHERE assessment_id = ?", [id])
            .map_err(StoreError::Delete)?;
        let n = tx
            .execute("DELETE FROM assessments WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        tx.commit().map_err(StoreError::Commit)?;
        Ok(n > 0)
    }
}

impl Repository<Grade> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Grade>, StoreError> {
        self.query_row_opt(
            "SELECT id, student_id, assessment_id, score, submitted_at, notes
             FROM grades WHERE id = ?",
            [id],
            row_to_grade,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Grade>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, student_id, assessment_id, score, submitted_at, notes
                 FROM grades ORDER BY id",
                [],
                row_to_grade,
            ),
            Scope::Student(student_id) => self.query_rows(
                "SELECT id, student_id, assessment_id, score, submitted_at, notes
                 FROM grades WHERE student_id = ? ORDER BY id",
                [student_id],
                row_to_grade,
            ),
            Scope::Assessment(assessment_id) => self.query_rows(
                "SELECT id, student_id, assessment_id, score, submitted_at, notes
                 FROM grades WHERE assessment_id = ? ORDER BY id",
                [assessment_id],
                row_to_grade,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &Grade) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO grades(id, student_id, assessment_id, score, submitted_at, notes)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     student_id = ?2, assessment_id = ?3, score = ?4, submitted_at = ?5, notes = ?6",
                (
                    &record.id,
                    &record.student_id,
                    &record.assessment_id,
                    record.score,
                    &record.submitted_at,
                    &record.notes,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let n = self
            .conn
            .execute("DELETE FROM grades WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        Ok(n > 0)
    }
}

impl Repository<AttendanceRecord> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<AttendanceRecord>, StoreError> {
        self.query_row_opt(
            "SELECT id, student_id, subject_id, date, status, note FROM attendance WHERE id = ?",
            [id],
            row_to_attendance,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<AttendanceRecord>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, student_id, subject_id, date, status, note
                 FROM attendance ORDER BY date, id",
                [],
                row_to_attendance,
            ),
            Scope::Student(student_id) => self.query_rows(
                "SELECT id, student_id, subject_id, date, status, note
                 FROM attendance WHERE student_id = ? ORDER BY date, id",
                [student_id],
                row_to_attendance,
            ),
            Scope::Subject(subject_id) => self.query_rows(
                "SELECT id, student_id, subject_id, date, status, note
                 FROM attendance WHERE subject_id = ? ORDER BY date, id",
                [subject_id],
                row_to_attendance,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO attendance(id, student_id, subject_id, date, status, note)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     student_id = ?2, subject_id = ?3, date = ?4, status = ?5, note = ?6",
                (
                    &record.id,
                    &record.student_id,
                    &record.subject_id,
                    &record.date,
                    record.status.as_str(),
                    &record.note,
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let n = self
            .conn
            .execute("DELETE FROM attendance WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        Ok(n > 0)
    }
}

impl Repository<TeacherAttendanceRecord> for SqliteStore {
    fn find_by_id(&self, id: &str) -> Result<Option<TeacherAttendanceRecord>, StoreError> {
        self.query_row_opt(
            "SELECT id, teacher_id, date, status FROM teacher_attendance WHERE id = ?",
            [id],
            row_to_teacher_attendance,
        )
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<TeacherAttendanceRecord>, StoreError> {
        match scope {
            Scope::All => self.query_rows(
                "SELECT id, teacher_id, date, status FROM teacher_attendance ORDER BY date, id",
                [],
                row_to_teacher_attendance,
            ),
            Scope::Teacher(teacher_id) => self.query_rows(
                "SELECT id, teacher_id, date, status
                 FROM teacher_attendance WHERE teacher_id = ? ORDER BY date, id",
                [teacher_id],
                row_to_teacher_attendance,
            ),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, record: &TeacherAttendanceRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO teacher_attendance(id, teacher_id, date, status)
                 VALUES(?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET teacher_id = ?2, date = ?3, status = ?4",
                (
                    &record.id,
                    &record.teacher_id,
                    &record.date,
                    record.status.as_str(),
                ),
            )
            .map_err(StoreError::Insert)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let n = self
            .conn
            .execute("DELETE FROM teacher_attendance WHERE id = ?", [id])
            .map_err(StoreError::Delete)?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentKind, AttendanceStatus, StudentStatus, TeacherStatus};

    fn temp_store(prefix: &str) -> SqliteStore {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let dir = std::env::temp_dir().join(format!("schoolhubd-{}-{}", prefix, nanos));
        SqliteStore::open(&dir).unwrap()
    }

    fn class(id: &str) -> Class {
        Class {
            id: id.to_string(),
            name: format!("Class {}", id),
            grade: "7".to_string(),
            year: 2025,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn subject(id: &str, class_id: &str, teacher_id: Option<&str>) -> Subject {
        Subject {
            id: id.to_string(),
            name: format!("Subject {}", id),
            code: format!("SUB-{}", id),
            description: None,
            class_id: class_id.to_string(),
            teacher_id: teacher_id.map(str::to_string),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn student(id: &str, class_id: &str) -> Student {
        Student {
            id: id.to_string(),
            name: format!("Student {}", id),
            email: format!("{}@school.test", id),
            process_number: format!("9{}", id),
            birth_date: None,
            class_id: class_id.to_string(),
            guardian_id: None,
            status: StudentStatus::Active,
            enrollment_date: "2024-09-01".to_string(),
        }
    }

    fn assessment(id: &str, subject_id: &str, class_id: &str) -> Assessment {
        Assessment {
            id: id.to_string(),
            name: format!("Assessment {}", id),
            subject_id: subject_id.to_string(),
            class_id: class_id.to_string(),
            trimester: 1,
            kind: AssessmentKind::Test,
            max_score: 100.0,
            weight: 1.0,
            date: "2025-03-15".to_string(),
            created_at: "2025-03-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn save_is_an_upsert_that_preserves_created_at() {
        let mut store = temp_store("upsert");
        store.save_class(&class("c1")).unwrap();

        let mut updated = class("c1");
        updated.name = "Renamed".to_string();
        updated.created_at = "2030-01-01T00:00:00Z".to_string();
        store.save_class(&updated).unwrap();

        let found = store.class("c1").unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
        assert_eq!(found.created_at, "2025-01-01T00:00:00Z");
        assert_eq!(store.classes().unwrap().len(), 1);
    }

    #[test]
    fn class_delete_cascades_to_all_dependents() {
        let mut store = temp_store("cascade");
        store.save_class(&class("c1")).unwrap();
        store.save_subject(&subject("sub1", "c1", None)).unwrap();
        store.save_student(&student("s1", "c1")).unwrap();
        store.save_assessment(&assessment("a1", "sub1", "c1")).unwrap();
        store
            .save_grade(&Grade {
                id: "g1".to_string(),
                student_id: "s1".to_string(),
                assessment_id: "a1".to_string(),
                score: 80.0,
                submitted_at: None,
                notes: None,
            })
            .unwrap();
        store
            .save_attendance(&AttendanceRecord {
                id: "att1".to_string(),
                student_id: "s1".to_string(),
                subject_id: "sub1".to_string(),
                date: "2025-03-15".to_string(),
                status: AttendanceStatus::Presente,
                note: None,
            })
            .unwrap();

        assert!(store.delete_class("c1").unwrap());
        assert!(store.classes().unwrap().is_empty());
        assert!(store.subjects(Scope::All).unwrap().is_empty());
        assert!(store.students(Scope::All).unwrap().is_empty());
        assert!(store.assessments(Scope::All).unwrap().is_empty());
        assert!(store.grades(Scope::All).unwrap().is_empty());
        assert!(store.attendance(Scope::All).unwrap().is_empty());

        assert!(!store.delete_class("c1").unwrap());
    }

    #[test]
    fn teacher_delete_clears_subject_links() {
        let mut store = temp_store("teacher");
        store.save_class(&class("c1")).unwrap();
        store
            .save_teacher(&Teacher {
                id: "t1".to_string(),
                name: "Prof".to_string(),
                email: "prof@school.test".to_string(),
                phone: "123".to_string(),
                hire_date: "2020-09-01".to_string(),
                status: TeacherStatus::Active,
            })
            .unwrap();
        store.save_subject(&subject("sub1", "c1", Some("t1"))).unwrap();
        store
            .save_teacher_attendance(&TeacherAttendanceRecord {
                id: "ta1".to_string(),
                teacher_id: "t1".to_string(),
                date: "2025-03-15".to_string(),
                status: AttendanceStatus::Presente,
            })
            .unwrap();

        assert!(store.delete_teacher("t1").unwrap());
        let remaining = store.subject("sub1").unwrap().unwrap();
        assert_eq!(remaining.teacher_id, None);
        assert!(store.teacher_attendance(Scope::All).unwrap().is_empty());
    }

    #[test]
    fn list_scopes_filter_by_foreign_key() {
        let mut store = temp_store("scopes");
        store.save_class(&class("c1")).unwrap();
        store.save_class(&class("c2")).unwrap();
        store.save_student(&student("s1", "c1")).unwrap();
        store.save_student(&student("s2", "c2")).unwrap();

        let in_c1 = store.students(Scope::Class("c1")).unwrap();
        assert_eq!(in_c1.len(), 1);
        assert_eq!(in_c1[0].id, "s1");

        // a scope the entity does not support
        assert!(store.students(Scope::Assessment("a1")).unwrap().is_empty());
    }
}
