use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::crypto::compare_password;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::patch::blank_to_none;
use crate::router::{Valid, trimmed, trimmed_option};
use crate::user::{NewUser, UserService};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be 1 to 50 characters long."
    ))]
    pub user_name: String,
    #[validate(custom(
        function = "crate::crypto::email_format",
        message = "Email must be formatted."
    ))]
    pub email: String,
    #[validate(length(max = 255, message = "Password is too long."))]
    pub password: String,
    #[serde(rename = "passwordCheck")]
    pub password_check: String,
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 20, message = "Phone number is too long."))]
    pub phone_number: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub user_id: String,
    pub email: String,
}

/// Handler to create user.
pub async fn handler(
    State(users): State<UserService>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Response>> {
    compare_password(&body.password, &body.password_check)?;

    let user = users
        .sign_up(NewUser {
            user_name: body.user_name,
            email: body.email,
            password: body.password,
            phone_number: body.phone_number.and_then(blank_to_none),
        })
        .await?;

    Ok(Envelope::ok(
        "Account created.",
        Response {
            user_id: user.id,
            email: user.email,
        },
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::{envelope, state};
    use crate::user::UserRepository;
    use crate::*;

    fn body(email: &str, password_check: &str) -> String {
        json!({
            "user_name": "Kim",
            "email": email,
            "password": "pw1",
            "passwordCheck": password_check,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_signup_handler() {
        let state = state();
        let app = app(state.clone());

        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/api/user/signup",
            body("Kim@Test.com", "pw1"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = envelope(response).await;
        assert_eq!(body.result_code, "200");
        let data = body.data.unwrap();
        assert_eq!(data["email"], "kim@test.com");
        assert_eq!(data["user_id"].as_str().unwrap().len(), 24);
        assert!(data.get("password").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let app = app(state());

        for expected in [StatusCode::OK, StatusCode::CONFLICT] {
            let response = make_request(
                None,
                app.clone(),
                Method::POST,
                "/api/user/signup",
                body("kim@test.com", "pw1"),
            )
            .await;
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_persisted() {
        let state = state();
        let app = app(state.clone());

        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/api/user/signup",
            body("not-an-email", "pw1"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = envelope(response).await.data.unwrap();
        assert_eq!(errors["errors"][0]["field"], "email");

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/user/signup",
            body("kim@test.com", "pw2"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(state.db.users.find_by_email("kim@test.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fields_are_trimmed_before_validation() {
        let state = state();
        let app = app(state.clone());

        for (payload, field) in [
            (
                json!({
                    "user_name": "   ",
                    "email": "kim@test.com",
                    "password": "pw1",
                    "passwordCheck": "pw1",
                }),
                "user_name",
            ),
            (
                json!({
                    "user_name": "Kim",
                    "email": "kim@test.com",
                    "password": "pw1",
                    "passwordCheck": "pw1",
                    "phone_number": "010-1234-5678-9012-3456",
                }),
                "phone_number",
            ),
        ] {
            let response = make_request(
                None,
                app.clone(),
                Method::POST,
                "/api/user/signup",
                payload.to_string(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let errors = envelope(response).await.data.unwrap();
            assert_eq!(errors["errors"][0]["field"], field);
        }
        assert!(state.db.users.find_by_email("kim@test.com").await.unwrap().is_none());

        let payload = json!({
            "user_name": "  Kim ",
            "email": "kim@test.com",
            "password": "pw1",
            "passwordCheck": "pw1",
            "phone_number": " 010-1234-5678 ",
        });
        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/user/signup",
            payload.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let user = state.db.users.find_by_email("kim@test.com").await.unwrap().unwrap();
        assert_eq!(user.user_name, "Kim");
        assert_eq!(user.phone_number.as_deref(), Some("010-1234-5678"));
    }
}
