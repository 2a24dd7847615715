mod academics;
mod auth;
mod common;
mod grading;
mod marking_scheme;
mod scores;
