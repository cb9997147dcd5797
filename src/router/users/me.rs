use axum::Extension;
use axum::extract::State;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::user::{Profile, UserService};

/// Full profile of the caller.
pub async fn handler(
    State(users): State<UserService>,
    Extension(caller): Extension<Caller>,
) -> Result<Envelope<Profile>> {
    let user = users.find_by_id(&caller.user_id).await?;

    Ok(Envelope::ok("User found.", Profile::from(&user)))
}
