pub mod academic_session;
pub mod ca_component;
pub mod class_arm;
pub mod class_subject;
pub mod grade_band;
pub mod grading_system;
pub mod grading_system_class;
pub mod marking_scheme;
pub mod marking_scheme_assignment;
pub mod marking_scheme_component;
pub mod result_batch;
pub mod role;
pub mod role_permission;
pub mod school;
pub mod school_class;
pub mod score;
pub mod student;
pub mod student_result;
pub mod subject;
pub mod term;
pub mod user;
