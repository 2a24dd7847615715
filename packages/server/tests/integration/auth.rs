use serde_json::json;

use crate::common::{ADMIN_PASSWORD, TestApp, routes};

mod onboarding {
    use super::*;

    #[tokio::test]
    async fn onboarding_creates_a_school_and_its_admin() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SCHOOLS,
                &json!({
                    "name": "Hillside Academy",
                    "admin_username": "head",
                    "admin_password": ADMIN_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["school"]["name"], "Hillside Academy");
        assert_eq!(res.body["admin_username"], "head");
    }

    #[tokio::test]
    async fn school_names_are_unique() {
        let app = TestApp::spawn().await;
        app.onboard_school("Hillside Academy", "head").await;

        let res = app
            .post_without_token(
                routes::SCHOOLS,
                &json!({
                    "name": "Hillside Academy",
                    "admin_username": "other",
                    "admin_password": ADMIN_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn admin_usernames_are_unique_across_schools() {
        let app = TestApp::spawn().await;
        app.onboard_school("Hillside Academy", "head").await;

        let res = app
            .post_without_token(
                routes::SCHOOLS,
                &json!({
                    "name": "Riverside College",
                    "admin_username": "head",
                    "admin_password": ADMIN_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn current_school_is_the_callers() {
        let app = TestApp::spawn().await;
        let token = app.onboard_school("Hillside Academy", "head").await;

        let res = app.get_with_token(routes::CURRENT_SCHOOL, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Hillside Academy");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token_and_permissions() {
        let app = TestApp::spawn().await;
        app.onboard_school("Hillside Academy", "head").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "head", "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["role"], "admin");
        let permissions = res.body["permissions"].as_array().unwrap();
        assert!(permissions.iter().any(|p| p == "result:approve"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.onboard_school("Hillside Academy", "head").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "head", "password": "wrongpass123"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn me_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn me_reflects_the_token() {
        let app = TestApp::spawn().await;
        let token = app.onboard_school("Hillside Academy", "head").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "head");
        assert_eq!(res.body["role"], "admin");
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn admin_creates_a_teacher_with_teacher_permissions() {
        let app = TestApp::spawn().await;
        let admin = app.onboard_school("Hillside Academy", "head").await;

        let teacher = app.create_user_with_role(&admin, "mrs_bello", "teacher").await;
        let res = app.get_with_token(routes::ME, &teacher).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "teacher");
        let permissions = res.body["permissions"].as_array().unwrap();
        assert!(permissions.iter().any(|p| p == "score:enter"));
        assert!(!permissions.iter().any(|p| p == "result:approve"));
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.onboard_school("Hillside Academy", "head").await;

        let res = app
            .post_with_token(
                routes::USERS,
                &json!({"username": "ghost", "password": "staffpass123", "role": "janitor"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn teachers_cannot_manage_users() {
        let app = TestApp::spawn().await;
        let admin = app.onboard_school("Hillside Academy", "head").await;
        let teacher = app.create_user_with_role(&admin, "mrs_bello", "teacher").await;

        let res = app.get_with_token(routes::USERS, &teacher).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
