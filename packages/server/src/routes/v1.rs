use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{academic, auth, grading, marking_scheme, result, school, score, user};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/schools", school_routes())
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/sessions", session_routes())
        .nest("/classes", class_routes())
        .nest("/subjects", subject_routes())
        .nest("/students", student_routes())
        .nest("/marking-schemes", marking_scheme_routes())
        .nest("/grading-systems", grading_routes())
        .nest("/scores", score_routes())
        .nest("/results", result_routes())
}

fn school_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(school::create_school))
        .routes(routes!(school::current_school))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(user::create_user, user::list_users))
}

fn session_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(academic::create_session, academic::list_sessions))
        .routes(routes!(academic::create_term, academic::list_terms))
}

fn class_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(academic::create_class, academic::list_classes))
        .routes(routes!(academic::create_class_arm, academic::list_class_arms))
        .routes(routes!(
            academic::set_class_subjects,
            academic::list_class_subjects
        ))
}

fn subject_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(academic::create_subject, academic::list_subjects))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(academic::create_student, academic::list_students))
}

fn marking_scheme_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            marking_scheme::create_marking_scheme,
            marking_scheme::list_marking_schemes
        ))
        .routes(routes!(marking_scheme::get_layout))
        .routes(routes!(marking_scheme::get_marking_scheme))
        .routes(routes!(marking_scheme::assign_marking_scheme))
}

fn grading_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            grading::create_grading_system,
            grading::list_grading_systems
        ))
        .routes(routes!(grading::resolve_grade))
        .routes(routes!(grading::get_grading_system))
        .routes(routes!(grading::assign_grading_system))
}

fn score_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(score::upsert_scores, score::list_scores))
}

fn result_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(result::submit_result))
        .routes(routes!(result::approve_result))
        .routes(routes!(result::list_batches))
        .routes(routes!(result::get_batch))
        .routes(routes!(result::get_student_report))
}
