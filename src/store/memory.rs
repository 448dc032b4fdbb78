use std::collections::HashMap;

use crate::model::{
    Assessment, AttendanceRecord, Class, Grade, Guardian, Student, Subject, Teacher,
    TeacherAttendanceRecord,
};
use crate::store::{Repository, Scope, Store, StoreError};

/// Ephemeral backend. Ordering mirrors the SQLite queries so both
/// stores answer list calls identically.
#[derive(Default)]
pub struct MemStore {
    classes: HashMap<String, Class>,
    subjects: HashMap<String, Subject>,
    students: HashMap<String, Student>,
    teachers: HashMap<String, Teacher>,
    guardians: HashMap<String, Guardian>,
    assessments: HashMap<String, Assessment>,
    grades: HashMap<String, Grade>,
    attendance: HashMap<String, AttendanceRecord>,
    teacher_attendance: HashMap<String, TeacherAttendanceRecord>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {}

impl Repository<Class> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Class>, StoreError> {
        Ok(self.classes.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Class>, StoreError> {
        let mut out: Vec<Class> = match scope {
            Scope::All => self.classes.values().cloned().collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &Class) -> Result<(), StoreError> {
        self.classes.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.classes.remove(id).is_none() {
            return Ok(false);
        }
        let subject_ids: Vec<String> = self
            .subjects
            .values()
            .filter(|s| s.class_id == id)
            .map(|s| s.id.clone())
            .collect();
        let student_ids: Vec<String> = self
            .students
            .values()
            .filter(|s| s.class_id == id)
            .map(|s| s.id.clone())
            .collect();
        let assessment_ids: Vec<String> = self
            .assessments
            .values()
            .filter(|a| a.class_id == id)
            .map(|a| a.id.clone())
            .collect();
        self.grades.retain(|_, g| {
            !assessment_ids.contains(&g.assessment_id) && !student_ids.contains(&g.student_id)
        });
        self.attendance.retain(|_, a| {
            !subject_ids.contains(&a.subject_id) && !student_ids.contains(&a.student_id)
        });
        self.assessments.retain(|_, a| a.class_id != id);
        self.students.retain(|_, s| s.class_id != id);
        self.subjects.retain(|_, s| s.class_id != id);
        Ok(true)
    }
}

impl Repository<Subject> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Subject>, StoreError> {
        Ok(self.subjects.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Subject>, StoreError> {
        let mut out: Vec<Subject> = match scope {
            Scope::All => self.subjects.values().cloned().collect(),
            Scope::Class(class_id) => self
                .subjects
                .values()
                .filter(|s| s.class_id == class_id)
                .cloned()
                .collect(),
            Scope::Teacher(teacher_id) => self
                .subjects
                .values()
                .filter(|s| s.teacher_id.as_deref() == Some(teacher_id))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &Subject) -> Result<(), StoreError> {
        self.subjects.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.subjects.remove(id).is_none() {
            return Ok(false);
        }
        let assessment_ids: Vec<String> = self
            .assessments
            .values()
            .filter(|a| a.subject_id == id)
            .map(|a| a.id.clone())
            .collect();
        self.grades
            .retain(|_, g| !assessment_ids.contains(&g.assessment_id));
        self.attendance.retain(|_, a| a.subject_id != id);
        self.assessments.retain(|_, a| a.subject_id != id);
        Ok(true)
    }
}

impl Repository<Student> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Student>, StoreError> {
        Ok(self.students.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Student>, StoreError> {
        let mut out: Vec<Student> = match scope {
            Scope::All => self.students.values().cloned().collect(),
            Scope::Class(class_id) => self
                .students
                .values()
                .filter(|s| s.class_id == class_id)
                .cloned()
                .collect(),
            Scope::Guardian(guardian_id) => self
                .students
                .values()
                .filter(|s| s.guardian_id.as_deref() == Some(guardian_id))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &Student) -> Result<(), StoreError> {
        self.students.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.students.remove(id).is_none() {
            return Ok(false);
        }
        self.grades.retain(|_, g| g.student_id != id);
        self.attendance.retain(|_, a| a.student_id != id);
        Ok(true)
    }
}

impl Repository<Teacher> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, StoreError> {
        Ok(self.teachers.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Teacher>, StoreError> {
        let mut out: Vec<Teacher> = match scope {
            Scope::All => self.teachers.values().cloned().collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &Teacher) -> Result<(), StoreError> {
        self.teachers.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.teachers.remove(id).is_none() {
            return Ok(false);
        }
        self.teacher_attendance.retain(|_, a| a.teacher_id != id);
        for subject in self.subjects.values_mut() {
            if subject.teacher_id.as_deref() == Some(id) {
                subject.teacher_id = None;
            }
        }
        Ok(true)
    }
}

impl Repository<Guardian> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Guardian>, StoreError> {
        Ok(self.guardians.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Guardian>, StoreError> {
        let mut out: Vec<Guardian> = match scope {
            Scope::All => self.guardians.values().cloned().collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &Guardian) -> Result<(), StoreError> {
        self.guardians.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.guardians.remove(id).is_none() {
            return Ok(false);
        }
        for student in self.students.values_mut() {
            if student.guardian_id.as_deref() == Some(id) {
                student.guardian_id = None;
            }
        }
        Ok(true)
    }
}

impl Repository<Assessment> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Assessment>, StoreError> {
        Ok(self.assessments.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Assessment>, StoreError> {
        let mut out: Vec<Assessment> = match scope {
            Scope::All => self.assessments.values().cloned().collect(),
            Scope::Subject(subject_id) => self
                .assessments
                .values()
                .filter(|a| a.subject_id == subject_id)
                .cloned()
                .collect(),
            Scope::Class(class_id) => self
                .assessments
                .values()
                .filter(|a| a.class_id == class_id)
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &Assessment) -> Result<(), StoreError> {
        self.assessments.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.assessments.remove(id).is_none() {
            return Ok(false);
        }
        self.grades.retain(|_, g| g.assessment_id != id);
        Ok(true)
    }
}

impl Repository<Grade> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Grade>, StoreError> {
        Ok(self.grades.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<Grade>, StoreError> {
        let mut out: Vec<Grade> = match scope {
            Scope::All => self.grades.values().cloned().collect(),
            Scope::Student(student_id) => self
                .grades
                .values()
                .filter(|g| g.student_id == student_id)
                .cloned()
                .collect(),
            Scope::Assessment(assessment_id) => self
                .grades
                .values()
                .filter(|g| g.assessment_id == assessment_id)
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn save(&mut self, record: &Grade) -> Result<(), StoreError> {
        self.grades.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.grades.remove(id).is_some())
    }
}

impl Repository<AttendanceRecord> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.attendance.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut out: Vec<AttendanceRecord> = match scope {
            Scope::All => self.attendance.values().cloned().collect(),
            Scope::Student(student_id) => self
                .attendance
                .values()
                .filter(|a| a.student_id == student_id)
                .cloned()
                .collect(),
            Scope::Subject(subject_id) => self
                .attendance
                .values()
                .filter(|a| a.subject_id == subject_id)
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.attendance.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.attendance.remove(id).is_some())
    }
}

impl Repository<TeacherAttendanceRecord> for MemStore {
    fn find_by_id(&self, id: &str) -> Result<Option<TeacherAttendanceRecord>, StoreError> {
        Ok(self.teacher_attendance.get(id).cloned())
    }

    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<TeacherAttendanceRecord>, StoreError> {
        let mut out: Vec<TeacherAttendanceRecord> = match scope {
            Scope::All => self.teacher_attendance.values().cloned().collect(),
            Scope::Teacher(teacher_id) => self
                .teacher_attendance
                .values()
                .filter(|a| a.teacher_id == teacher_id)
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn save(&mut self, record: &TeacherAttendanceRecord) -> Result<(), StoreError> {
        self.teacher_attendance
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.teacher_attendance.remove(id).is_some())
    }
}
