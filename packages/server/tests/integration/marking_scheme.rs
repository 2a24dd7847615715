use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn scheme_total_is_the_sum_of_component_maxima() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;

    let res = app.get_with_token(&routes::marking_scheme(setup.scheme_id), &token).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["total_score"], 140.0);
    let components = res.body["components"].as_array().unwrap();
    assert_eq!(components.len(), 2);
    assert_eq!(components[1]["sub_components"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sub_components_may_not_exceed_their_component() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;

    let res = app
        .post_with_token(
            routes::MARKING_SCHEMES,
            &json!({
                "name": "Broken",
                "components": [{
                    "name": "CA",
                    "score": 30.0,
                    "component_type": "CA",
                    "sub_components": [
                        {"name": "Test 1", "score": 20.0},
                        {"name": "Test 2", "score": 20.0},
                    ],
                }],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn exam_components_cannot_have_sub_components() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;

    let res = app
        .post_with_token(
            routes::MARKING_SCHEMES,
            &json!({
                "name": "Broken",
                "components": [{
                    "name": "Exam",
                    "score": 100.0,
                    "component_type": "EXAM",
                    "sub_components": [{"name": "Paper 1", "score": 50.0}],
                }],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn exam_layout_lists_every_column() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;

    let res = app
        .get_with_token(
            &format!(
                "{}?class_id={}&term_id={}&scope=exam",
                routes::MARKING_SCHEME_LAYOUT,
                setup.class_id,
                setup.term_id
            ),
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["scope"], "EXAM");
    assert_eq!(res.body["total_score"], 140.0);
    // Exam, Test 1, Test 2, CA subtotal, total, grade
    assert_eq!(res.body["columns"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn ca_layout_narrows_to_one_component() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;

    let res = app
        .get_with_token(
            &format!(
                "{}?class_id={}&term_id={}&scope=CA&result_type_id={}",
                routes::MARKING_SCHEME_LAYOUT,
                setup.class_id,
                setup.term_id,
                setup.ca_id
            ),
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total_score"], 40.0);
    assert_eq!(res.body["components"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn ca_layout_without_result_type_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;

    let res = app
        .get_with_token(
            &format!(
                "{}?class_id={}&term_id={}&scope=CA",
                routes::MARKING_SCHEME_LAYOUT,
                setup.class_id,
                setup.term_id
            ),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn layout_without_assignment_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let session_id = app.create_named(routes::SESSIONS, "2024/2025", &token).await;
    let term_id = app.create_named(&routes::terms(session_id), "First Term", &token).await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;

    let res = app
        .get_with_token(
            &format!(
                "{}?class_id={class_id}&term_id={term_id}&scope=EXAM",
                routes::MARKING_SCHEME_LAYOUT
            ),
            &token,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn reassigning_replaces_the_scheme_for_the_term() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;

    let other = app
        .post_with_token(
            routes::MARKING_SCHEMES,
            &json!({
                "name": "Exam only",
                "components": [{"name": "Exam", "score": 100.0, "component_type": "EXAM"}],
            }),
            &token,
        )
        .await;
    assert_eq!(other.status, 201);

    let res = app
        .post_with_token(
            &routes::marking_scheme_assignments(other.id()),
            &json!({"class_id": setup.class_id, "term_id": setup.term_id}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["marking_scheme_id"], other.id());

    let layout = app
        .get_with_token(
            &format!(
                "{}?class_id={}&term_id={}&scope=EXAM",
                routes::MARKING_SCHEME_LAYOUT,
                setup.class_id,
                setup.term_id
            ),
            &token,
        )
        .await;
    assert_eq!(layout.body["total_score"], 100.0);
}
