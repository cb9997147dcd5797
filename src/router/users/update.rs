//! Update profile of the caller.

use axum::Extension;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::crypto::compare_password;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::patch::blank_to_none;
use crate::router::{Valid, trimmed_option};
use crate::user::{Profile, ProfileChanges, UserService};

#[derive(Debug, Default, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(max = 255, message = "Password is too long."))]
    pub password: Option<String>,
    #[serde(rename = "passwordCheck")]
    pub password_check: Option<String>,
    pub intro_yn: Option<bool>,
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 20, message = "Phone number is too long."))]
    pub phone_number: Option<String>,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
}

pub async fn handler(
    State(users): State<UserService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Profile>> {
    if let Some(password) = &body.password {
        compare_password(password, body.password_check.as_deref().unwrap_or_default())?;
    }

    let changes = ProfileChanges {
        password: body.password,
        intro_yn: body.intro_yn,
        phone_number: body.phone_number.map(blank_to_none),
        file_key: body.file_key.map(blank_to_none),
        file_name: body.file_name.map(blank_to_none),
    };

    let outcome = users.update(&caller.user_id, changes).await?;

    Ok(Envelope::updated(
        "Profile updated.",
        outcome.map(|user| Profile::from(&user)),
    ))
}
