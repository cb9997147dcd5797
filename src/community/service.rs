use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Utc;

use crate::AppState;
use crate::community::{NewPost, Post, PostChanges, PostRepository, field};
use crate::crypto::object_id;
use crate::error::{Result, ServerError};
use crate::patch::{Outcome, Patch};
use crate::user::UserRepository;

/// Community board manager.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl FromRef<AppState> for PostService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.db.posts), Arc::clone(&state.db.users))
    }
}

impl PostService {
    /// Create a new [`PostService`].
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    pub async fn create(&self, author_id: &str, new_post: NewPost) -> Result<Post> {
        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ServerError::NotFound("user"))?;

        let post = Post {
            id: object_id(),
            user_id: author.id,
            user_name: author.user_name,
            title: new_post.title,
            content: new_post.content,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.posts.insert(&post).await?;
        tracing::debug!(post_id = %post.id, "post published");

        Ok(post)
    }

    pub async fn list(&self) -> Result<Vec<Post>> {
        self.posts.list().await
    }

    /// Find a post using `id` field.
    pub async fn find(&self, id: &str) -> Result<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound("post"))
    }

    /// Load a post and make sure `caller` wrote it.
    async fn find_authored(&self, id: &str, caller: &str) -> Result<Post> {
        let post = self.find(id).await?;
        if post.user_id != caller {
            return Err(ServerError::Forbidden);
        }

        Ok(post)
    }

    /// Apply the submitted values that differ from the stored ones.
    pub async fn update(
        &self,
        caller: &str,
        post_id: &str,
        changes: PostChanges,
    ) -> Result<Outcome<Post>> {
        let mut post = self.find_authored(post_id, caller).await?;

        let mut patch = Patch::new();
        patch.set(field::TITLE, &mut post.title, changes.title);
        patch.set(field::CONTENT, &mut post.content, changes.content);

        if patch.is_empty() {
            return Ok(Outcome::Unmodified(post));
        }

        post.updated_at = Some(Utc::now());
        self.posts.update(&post, &patch).await?;
        tracing::debug!(post_id = %post.id, fields = ?patch, "post updated");

        Ok(Outcome::Updated(post))
    }

    pub async fn delete(&self, caller: &str, post_id: &str) -> Result<()> {
        let post = self.find_authored(post_id, caller).await?;

        if !self.posts.delete(&post.id).await? {
            return Err(ServerError::NotFound("post"));
        }
        tracing::debug!(post_id, "post deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::user::User;

    async fn setup() -> PostService {
        let store = MemoryStore::default();
        for id in ["kim", "lee"] {
            let user = User {
                id: id.into(),
                user_name: id.to_uppercase(),
                email: format!("{id}@test.com"),
                created_at: Utc::now(),
                ..Default::default()
            };
            UserRepository::insert(&store, &user).await.unwrap();
        }

        PostService::new(Arc::new(store.clone()), Arc::new(store))
    }

    fn tips() -> NewPost {
        NewPost {
            title: "Interview tips".into(),
            content: "Practice out loud.".into(),
        }
    }

    #[tokio::test]
    async fn test_publish_and_read() {
        let posts = setup().await;
        let post = posts.create("kim", tips()).await.unwrap();

        assert_eq!(post.user_name, "KIM");
        assert_eq!(posts.find(&post.id).await.unwrap(), post);
        assert_eq!(posts.list().await.unwrap(), vec![post]);
        assert!(matches!(
            posts.create("ghost", tips()).await,
            Err(ServerError::NotFound("user"))
        ));
    }

    #[tokio::test]
    async fn test_author_only_changes() {
        let posts = setup().await;
        let post = posts.create("kim", tips()).await.unwrap();

        let changes = PostChanges {
            content: Some("Record yourself.".into()),
            ..Default::default()
        };
        assert!(matches!(
            posts.update("lee", &post.id, changes.clone()).await,
            Err(ServerError::Forbidden)
        ));
        assert!(posts.update("kim", &post.id, changes.clone()).await.unwrap().is_modified());
        assert!(!posts.update("kim", &post.id, changes).await.unwrap().is_modified());

        assert!(matches!(
            posts.delete("lee", &post.id).await,
            Err(ServerError::Forbidden)
        ));
        posts.delete("kim", &post.id).await.unwrap();
        assert!(matches!(
            posts.find(&post.id).await,
            Err(ServerError::NotFound("post"))
        ));
    }
}
