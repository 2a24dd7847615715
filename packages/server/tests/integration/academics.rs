use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn terms_belong_to_their_session() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let session_id = app.create_named(routes::SESSIONS, "2024/2025", &token).await;

    app.create_named(&routes::terms(session_id), "First Term", &token).await;
    app.create_named(&routes::terms(session_id), "Second Term", &token).await;

    let res = app.get_with_token(&routes::terms(session_id), &token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_session_name_conflicts() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    app.create_named(routes::SESSIONS, "2024/2025", &token).await;

    let res = app
        .post_with_token(routes::SESSIONS, &json!({"name": "2024/2025"}), &token)
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;

    let res = app
        .post_with_token(routes::CLASSES, &json!({"name": "   "}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn schools_cannot_see_each_others_classes() {
    let app = TestApp::spawn().await;
    let first = app.onboard_school("Hillside Academy", "head").await;
    let second = app.onboard_school("Riverside College", "principal").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &first).await;

    let listed = app.get_with_token(routes::CLASSES, &second).await;
    assert_eq!(listed.status, 200);
    assert!(listed.body.as_array().unwrap().is_empty());

    let arms = app.get_with_token(&routes::arms(class_id), &second).await;
    assert_eq!(arms.status, 404);
    assert_eq!(arms.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn subject_codes_are_uppercased_and_unique() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;

    let res = app
        .post_with_token(
            routes::SUBJECTS,
            &json!({"name": "English Language", "code": "eng"}),
            &token,
        )
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["code"], "ENG");

    let dup = app
        .post_with_token(
            routes::SUBJECTS,
            &json!({"name": "English Literature", "code": "ENG"}),
            &token,
        )
        .await;
    assert_eq!(dup.status, 409);
}

#[tokio::test]
async fn class_subjects_are_replaced_wholesale() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;
    let maths = app
        .post_with_token(routes::SUBJECTS, &json!({"name": "Mathematics", "code": "MTH"}), &token)
        .await
        .id();
    let english = app
        .post_with_token(routes::SUBJECTS, &json!({"name": "English", "code": "ENG"}), &token)
        .await
        .id();

    let first = app
        .put_with_token(
            &routes::class_subjects(class_id),
            &json!({"subject_ids": [maths, english]}),
            &token,
        )
        .await;
    assert_eq!(first.status, 200);
    assert_eq!(first.body.as_array().unwrap().len(), 2);

    let second = app
        .put_with_token(
            &routes::class_subjects(class_id),
            &json!({"subject_ids": [english]}),
            &token,
        )
        .await;
    assert_eq!(second.status, 200);

    let res = app.get_with_token(&routes::class_subjects(class_id), &token).await;
    let subjects = res.body.as_array().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["code"], "ENG");
}

#[tokio::test]
async fn students_must_join_an_arm_of_their_class() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let jss1 = app.create_named(routes::CLASSES, "JSS1", &token).await;
    let jss2 = app.create_named(routes::CLASSES, "JSS2", &token).await;
    let jss2_a = app.create_named(&routes::arms(jss2), "A", &token).await;

    let res = app
        .post_with_token(
            routes::STUDENTS,
            &json!({
                "first_name": "Ada",
                "last_name": "Obi",
                "admission_number": "HA/001",
                "class_id": jss1,
                "class_arm_id": jss2_a,
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn students_are_listed_per_arm_with_pagination() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;
    let arm_a = app.create_named(&routes::arms(class_id), "A", &token).await;
    let arm_b = app.create_named(&routes::arms(class_id), "B", &token).await;

    for n in 0..3 {
        app.create_student(&token, &format!("A/{n}"), class_id, arm_a).await;
    }
    app.create_student(&token, "B/0", class_id, arm_b).await;

    let res = app
        .get_with_token(
            &format!("{}?class_arm_id={arm_a}&per_page=2", routes::STUDENTS),
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["pagination"]["total"], 3);
    assert_eq!(res.body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn teachers_can_view_but_not_manage_structure() {
    let app = TestApp::spawn().await;
    let admin = app.onboard_school("Hillside Academy", "head").await;
    let teacher = app.create_user_with_role(&admin, "mrs_bello", "teacher").await;

    let view = app.get_with_token(routes::CLASSES, &teacher).await;
    assert_eq!(view.status, 200);

    let create = app
        .post_with_token(routes::CLASSES, &json!({"name": "JSS1"}), &teacher)
        .await;
    assert_eq!(create.status, 403);
}
