pub mod academic;
pub mod auth;
pub mod grading;
pub mod marking_scheme;
pub mod result;
pub mod school;
pub mod score;
pub mod user;
