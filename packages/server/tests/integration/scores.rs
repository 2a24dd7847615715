use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn entering_scores_twice_overwrites_them() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;
    let student = app.create_student(&token, "HA/001", setup.class_id, setup.arm_id).await;

    app.enter_scores(&token, &setup, student, 50.0, 10.0, 10.0).await;
    app.enter_scores(&token, &setup, student, 55.0, 12.0, 9.5).await;

    let res = app
        .get_with_token(
            &format!(
                "{}?session_id={}&term_id={}&class_arm_id={}&subject_id={}",
                routes::SCORES,
                setup.session_id,
                setup.term_id,
                setup.arm_id,
                setup.subject_id
            ),
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let rows = res.body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let exam = rows
        .iter()
        .find(|r| r["component_id"] == setup.exam_id && r["ca_component_id"].is_null())
        .unwrap();
    assert_eq!(exam["score"], 55.0);
    let test2 = rows
        .iter()
        .find(|r| r["ca_component_id"] == setup.test2_id)
        .unwrap();
    assert_eq!(test2["score"], 9.5);
}

#[tokio::test]
async fn scores_above_the_coordinate_maximum_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;
    let student = app.create_student(&token, "HA/001", setup.class_id, setup.arm_id).await;

    let res = app
        .put_with_token(
            routes::SCORES,
            &json!({
                "session_id": setup.session_id,
                "term_id": setup.term_id,
                "class_id": setup.class_id,
                "class_arm_id": setup.arm_id,
                "subject_id": setup.subject_id,
                "entries": [
                    {"student_id": student, "component_id": setup.ca_id, "ca_component_id": setup.test1_id, "score": 21.0},
                ],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn sub_divided_components_require_a_sub_component() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;
    let student = app.create_student(&token, "HA/001", setup.class_id, setup.arm_id).await;

    let res = app
        .put_with_token(
            routes::SCORES,
            &json!({
                "session_id": setup.session_id,
                "term_id": setup.term_id,
                "class_id": setup.class_id,
                "class_arm_id": setup.arm_id,
                "subject_id": setup.subject_id,
                "entries": [
                    {"student_id": student, "component_id": setup.ca_id, "score": 30.0},
                ],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn students_of_another_arm_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;
    let arm_b = app.create_named(&routes::arms(setup.class_id), "B", &token).await;
    let outsider = app.create_student(&token, "HA/009", setup.class_id, arm_b).await;

    let res = app
        .put_with_token(
            routes::SCORES,
            &json!({
                "session_id": setup.session_id,
                "term_id": setup.term_id,
                "class_id": setup.class_id,
                "class_arm_id": setup.arm_id,
                "subject_id": setup.subject_id,
                "entries": [
                    {"student_id": outsider, "component_id": setup.exam_id, "score": 50.0},
                ],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn duplicate_coordinates_in_one_request_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let setup = app.setup_class(&token).await;
    let student = app.create_student(&token, "HA/001", setup.class_id, setup.arm_id).await;

    let res = app
        .put_with_token(
            routes::SCORES,
            &json!({
                "session_id": setup.session_id,
                "term_id": setup.term_id,
                "class_id": setup.class_id,
                "class_arm_id": setup.arm_id,
                "subject_id": setup.subject_id,
                "entries": [
                    {"student_id": student, "component_id": setup.exam_id, "score": 50.0},
                    {"student_id": student, "component_id": setup.exam_id, "score": 60.0},
                ],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn principals_cannot_enter_scores() {
    let app = TestApp::spawn().await;
    let admin = app.onboard_school("Hillside Academy", "head").await;
    let principal = app.create_user_with_role(&admin, "dr_okafor", "principal").await;
    let setup = app.setup_class(&admin).await;
    let student = app.create_student(&admin, "HA/001", setup.class_id, setup.arm_id).await;

    let res = app
        .put_with_token(
            routes::SCORES,
            &json!({
                "session_id": setup.session_id,
                "term_id": setup.term_id,
                "class_id": setup.class_id,
                "class_arm_id": setup.arm_id,
                "subject_id": setup.subject_id,
                "entries": [
                    {"student_id": student, "component_id": setup.exam_id, "score": 50.0},
                ],
            }),
            &principal,
        )
        .await;

    assert_eq!(res.status, 403);
}
