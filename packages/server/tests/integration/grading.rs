use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn standard_bands() -> Value {
    json!([
        {"grade": "A", "score_start_point": 80.0, "score_end_point": 140.0, "remark": "Excellent"},
        {"grade": "B", "score_start_point": 70.0, "score_end_point": 79.99, "remark": "Very good"},
        {"grade": "C", "score_start_point": 50.0, "score_end_point": 69.99, "remark": "Credit"},
        {"grade": "F", "score_start_point": 0.0, "score_end_point": 49.99, "remark": "Fail"},
    ])
}

/// Create the standard grading system, assign it to `class_id` and return its id.
pub async fn assign_standard_grading(app: &TestApp, token: &str, class_id: i32) -> i32 {
    let created = app
        .post_with_token(
            routes::GRADING_SYSTEMS,
            &json!({"name": "Standard", "bands": standard_bands()}),
            token,
        )
        .await;
    assert_eq!(created.status, 201, "create_grading_system failed: {}", created.text);
    let id = created.id();

    let assigned = app
        .put_with_token(
            &routes::grading_system_classes(id),
            &json!({"class_ids": [class_id]}),
            token,
        )
        .await;
    assert_eq!(assigned.status, 200, "assign_grading_system failed: {}", assigned.text);
    id
}

#[tokio::test]
async fn bands_are_returned_highest_first() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;
    let id = assign_standard_grading(&app, &token, class_id).await;

    let res = app.get_with_token(&routes::grading_system(id), &token).await;

    assert_eq!(res.status, 200);
    let grades: Vec<&str> = res.body["bands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["grade"].as_str().unwrap())
        .collect();
    assert_eq!(grades, ["A", "B", "C", "F"]);
    assert_eq!(res.body["class_ids"], json!([class_id]));
}

#[tokio::test]
async fn overlapping_bands_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;

    let res = app
        .post_with_token(
            routes::GRADING_SYSTEMS,
            &json!({
                "name": "Broken",
                "bands": [
                    {"grade": "A", "score_start_point": 70.0, "score_end_point": 100.0, "remark": "Excellent"},
                    {"grade": "B", "score_start_point": 60.0, "score_end_point": 70.0, "remark": "Good"},
                ],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn band_boundaries_are_inclusive() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;
    assign_standard_grading(&app, &token, class_id).await;

    for (score, grade) in [(80.0, "A"), (79.99, "B"), (70.0, "B"), (0.0, "F")] {
        let res = app
            .get_with_token(
                &format!("{}?class_id={class_id}&score={score}", routes::RESOLVE_GRADE),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["grade"]["grade"], grade, "score {score}");
    }
}

#[tokio::test]
async fn scores_outside_every_band_have_no_grade() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;
    assign_standard_grading(&app, &token, class_id).await;

    let res = app
        .get_with_token(
            &format!("{}?class_id={class_id}&score=79.995", routes::RESOLVE_GRADE),
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.body["grade"].is_null());
}

#[tokio::test]
async fn class_without_grading_system_has_no_grade() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;

    let res = app
        .get_with_token(
            &format!("{}?class_id={class_id}&score=50", routes::RESOLVE_GRADE),
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.body["grade"].is_null());
}

#[tokio::test]
async fn assigning_moves_a_class_between_systems() {
    let app = TestApp::spawn().await;
    let token = app.onboard_school("Hillside Academy", "head").await;
    let class_id = app.create_named(routes::CLASSES, "JSS1", &token).await;
    let first = assign_standard_grading(&app, &token, class_id).await;

    let second = app
        .post_with_token(
            routes::GRADING_SYSTEMS,
            &json!({
                "name": "Pass/fail",
                "bands": [
                    {"grade": "P", "score_start_point": 50.0, "score_end_point": 140.0, "remark": "Pass"},
                    {"grade": "F", "score_start_point": 0.0, "score_end_point": 49.99, "remark": "Fail"},
                ],
            }),
            &token,
        )
        .await
        .id();
    let res = app
        .put_with_token(
            &routes::grading_system_classes(second),
            &json!({"class_ids": [class_id]}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);

    let old = app.get_with_token(&routes::grading_system(first), &token).await;
    assert_eq!(old.body["class_ids"], json!([]));

    let resolved = app
        .get_with_token(
            &format!("{}?class_id={class_id}&score=75", routes::RESOLVE_GRADE),
            &token,
        )
        .await;
    assert_eq!(resolved.body["grade"]["grade"], "P");
}
