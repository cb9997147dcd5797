use axum::Extension;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::community::{NewPost, Post, PostService};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be 1 to 100 characters long."
    ))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be 1 to 10000 characters long."
    ))]
    pub content: String,
}

pub async fn handler(
    State(posts): State<PostService>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Post>> {
    let post = posts
        .create(
            &caller.user_id,
            NewPost {
                title: body.title,
                content: body.content,
            },
        )
        .await?;

    Ok(Envelope::ok("Post published.", post))
}
