pub mod analytics;
pub mod assessments;
pub mod attendance;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod exports;
pub mod grades;
pub mod guardians;
pub mod reports;
pub mod students;
pub mod subjects;
pub mod teachers;
