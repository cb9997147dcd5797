use axum::extract::{Path, State};

use crate::community::{Post, PostService};
use crate::envelope::Envelope;
use crate::error::Result;

/// Every post, newest first.
pub async fn list(State(posts): State<PostService>) -> Result<Envelope<Vec<Post>>> {
    Ok(Envelope::ok("Posts found.", posts.list().await?))
}

pub async fn handler(
    State(posts): State<PostService>,
    Path(post_id): Path<String>,
) -> Result<Envelope<Post>> {
    Ok(Envelope::ok("Post found.", posts.find(&post_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRef;
    use axum::http::StatusCode;

    use crate::community::{NewPost, PostService};
    use crate::router::{envelope, register, state};
    use crate::*;

    #[tokio::test]
    async fn test_get_handlers() {
        let state = state();
        let app = app(state.clone());
        let (user_id, _) = register(&state, "kim").await;

        let posts = PostService::from_ref(&state);
        let mut ids = Vec::new();
        for title in ["first", "second"] {
            let post = posts
                .create(
                    &user_id,
                    NewPost {
                        title: title.into(),
                        content: "body".into(),
                    },
                )
                .await
                .unwrap();
            ids.push(post.id);
        }

        let response =
            make_request(None, app.clone(), Method::GET, "/api/community/", String::default())
                .await;
        let data = envelope(response).await.data.unwrap();
        assert_eq!(data[0]["title"], "second");
        assert_eq!(data[1]["title"], "first");

        let path = format!("/api/community/{}", ids[0]);
        let response =
            make_request(None, app.clone(), Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = make_request(
            None,
            app,
            Method::GET,
            "/api/community/unknown",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
