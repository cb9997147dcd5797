use axum::Extension;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::community::{Post, PostChanges, PostService};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;

#[derive(Debug, Default, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be 1 to 100 characters long."
    ))]
    pub title: Option<String>,
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be 1 to 10000 characters long."
    ))]
    pub content: Option<String>,
}

/// Author only.
pub async fn handler(
    State(posts): State<PostService>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<String>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<Post>> {
    let changes = PostChanges {
        title: body.title,
        content: body.content,
    };

    let outcome = posts.update(&caller.user_id, &post_id, changes).await?;

    Ok(Envelope::updated("Post updated.", outcome))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::{envelope, register, state};
    use crate::*;

    #[tokio::test]
    async fn test_update_handler() {
        let state = state();
        let app = app(state.clone());
        let (_, kim) = register(&state, "kim").await;
        let (_, lee) = register(&state, "lee").await;

        let body = json!({ "title": "Mock interview", "content": "Who is in?" }).to_string();
        let response =
            make_request(Some(&kim), app.clone(), Method::POST, "/api/community/", body).await;
        let post_id = envelope(response).await.data.unwrap()["post_id"]
            .as_str()
            .unwrap()
            .to_owned();
        let path = format!("/api/community/{post_id}");

        let body = json!({ "content": "Saturday 10am." }).to_string();
        let response =
            make_request(Some(&lee), app.clone(), Method::PUT, &path, body.clone()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response =
            make_request(Some(&kim), app.clone(), Method::PUT, &path, body.clone()).await;
        assert_eq!(envelope(response).await.message, "Post updated.");

        let response = make_request(Some(&kim), app, Method::PUT, &path, body).await;
        let unchanged = envelope(response).await;
        assert_eq!(unchanged.message, "No changes.");
        assert_eq!(unchanged.data.unwrap()["title"], "Mock interview");
    }
}
