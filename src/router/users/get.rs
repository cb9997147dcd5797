//! Get public profile of a user.

use axum::extract::{Path, State};

use crate::envelope::Envelope;
use crate::error::Result;
use crate::user::{PublicProfile, UserService};

pub async fn handler(
    State(users): State<UserService>,
    Path(user_id): Path<String>,
) -> Result<Envelope<PublicProfile>> {
    let user = users.find_by_id(&user_id).await?;

    Ok(Envelope::ok("User found.", PublicProfile::from(&user)))
}
