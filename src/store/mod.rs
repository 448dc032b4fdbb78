pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemStore;
pub use sqlite::SqliteStore;

use crate::model::{
    Assessment, AttendanceRecord, Class, Grade, Guardian, Student, Subject, Teacher,
    TeacherAttendanceRecord,
};

/// Foreign-key filter for list queries. Scopes that do not apply to an
/// entity yield an empty list.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    All,
    Class(&'a str),
    Subject(&'a str),
    Student(&'a str),
    Assessment(&'a str),
    Teacher(&'a str),
    Guardian(&'a str),
}

/// Per-entity persistence capability. `save` is an upsert keyed by id;
/// `delete` removes dependents first and reports whether the id existed.
pub trait Repository<T> {
    fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;
    fn list_by(&self, scope: Scope<'_>) -> Result<Vec<T>, StoreError>;
    fn save(&mut self, record: &T) -> Result<(), StoreError>;
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;
}

/// One object safe surface over all entity repositories. The named
/// methods exist so call sites never need UFCS disambiguation.
pub trait Store:
    Repository<Class>
    + Repository<Subject>
    + Repository<Student>
    + Repository<Teacher>
    + Repository<Guardian>
    + Repository<Assessment>
    + Repository<Grade>
    + Repository<AttendanceRecord>
    + Repository<TeacherAttendanceRecord>
{
    fn class(&self, id: &str) -> Result<Option<Class>, StoreError> {
        Repository::<Class>::find_by_id(self, id)
    }
    fn classes(&self) -> Result<Vec<Class>, StoreError> {
        Repository::<Class>::list_by(self, Scope::All)
    }
    fn save_class(&mut self, record: &Class) -> Result<(), StoreError> {
        Repository::<Class>::save(self, record)
    }
    fn delete_class(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Class>::delete(self, id)
    }

    fn subject(&self, id: &str) -> Result<Option<Subject>, StoreError> {
        Repository::<Subject>::find_by_id(self, id)
    }
    fn subjects(&self, scope: Scope<'_>) -> Result<Vec<Subject>, StoreError> {
        Repository::<Subject>::list_by(self, scope)
    }
    fn save_subject(&mut self, record: &Subject) -> Result<(), StoreError> {
        Repository::<Subject>::save(self, record)
    }
    fn delete_subject(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Subject>::delete(self, id)
    }

    fn student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        Repository::<Student>::find_by_id(self, id)
    }
    fn students(&self, scope: Scope<'_>) -> Result<Vec<Student>, StoreError> {
        Repository::<Student>::list_by(self, scope)
    }
    fn save_student(&mut self, record: &Student) -> Result<(), StoreError> {
        Repository::<Student>::save(self, record)
    }
    fn delete_student(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Student>::delete(self, id)
    }

    fn teacher(&self, id: &str) -> Result<Option<Teacher>, StoreError> {
        Repository::<Teacher>::find_by_id(self, id)
    }
    fn teachers(&self) -> Result<Vec<Teacher>, StoreError> {
        Repository::<Teacher>::list_by(self, Scope::All)
    }
    fn save_teacher(&mut self, record: &Teacher) -> Result<(), StoreError> {
        Repository::<Teacher>::save(self, record)
    }
    fn delete_teacher(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Teacher>::delete(self, id)
    }

    fn guardian(&self, id: &str) -> Result<Option<Guardian>, StoreError> {
        Repository::<Guardian>::find_by_id(self, id)
    }
    fn guardians(&self) -> Result<Vec<Guardian>, StoreError> {
        Repository::<Guardian>::list_by(self, Scope::All)
    }
    fn save_guardian(&mut self, record: &Guardian) -> Result<(), StoreError> {
        Repository::<Guardian>::save(self, record)
    }
    fn delete_guardian(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Guardian>::delete(self, id)
    }

    fn assessment(&self, id: &str) -> Result<Option<Assessment>, StoreError> {
        Repository::<Assessment>::find_by_id(self, id)
    }
    fn assessments(&self, scope: Scope<'_>) -> Result<Vec<Assessment>, StoreError> {
        Repository::<Assessment>::list_by(self, scope)
    }
    fn save_assessment(&mut self, record: &Assessment) -> Result<(), StoreError> {
        Repository::<Assessment>::save(self, record)
    }
    fn delete_assessment(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Assessment>::delete(self, id)
    }

    fn grades(&self, scope: Scope<'_>) -> Result<Vec<Grade>, StoreError> {
        Repository::<Grade>::list_by(self, scope)
    }
    fn save_grade(&mut self, record: &Grade) -> Result<(), StoreError> {
        Repository::<Grade>::save(self, record)
    }
    fn delete_grade(&mut self, id: &str) -> Result<bool, StoreError> {
        Repository::<Grade>::delete(self, id)
    }

    fn attendance(&self, scope: Scope<'_>) -> Result<Vec<AttendanceRecord>, StoreError> {
        Repository::<AttendanceRecord>::list_by(self, scope)
    }
    fn save_attendance(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        Repository::<AttendanceRecord>::save(self, record)
    }

    fn teacher_attendance(
        &self,
        scope: Scope<'_>,
    ) -> Result<Vec<TeacherAttendanceRecord>, StoreError> {
        Repository::<TeacherAttendanceRecord>::list_by(self, scope)
    }
    fn save_teacher_attendance(
        &mut self,
        record: &TeacherAttendanceRecord,
    ) -> Result<(), StoreError> {
        Repository::<TeacherAttendanceRecord>::save(self, record)
    }
}
