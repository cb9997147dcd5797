use axum::Extension;
use axum::extract::{Path, State};

use crate::community::PostService;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;

/// Author only.
pub async fn handler(
    State(posts): State<PostService>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<String>,
) -> Result<Envelope<()>> {
    posts.delete(&caller.user_id, &post_id).await?;

    Ok(Envelope::message("Post deleted."))
}
