// Review Service - creating and reading users, posts and comments

use crate::application::validation;
use crate::domain::{Comment, Post, PostView, Role, User, VoteTarget};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, ReviewRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// New account, as returned by the music service login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub provider_id: String,
    pub username: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub song_id: String,
    pub title: String,
    pub body: Option<String>,
    pub rating: i64,
}

/// Review Service
pub struct ReviewService {
    repo: Arc<dyn ReviewRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ReviewService {
    pub fn new(
        repo: Arc<dyn ReviewRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
        }
    }

    pub async fn create_user(&self, req: NewUser) -> Result<User> {
        validation::non_blank("provider_id", &req.provider_id, validation::MAX_TITLE_LEN)?;
        validation::username(&req.username)?;
        if let Some(name) = &req.display_name {
            validation::non_blank("display_name", name, validation::MAX_DISPLAY_NAME_LEN)?;
        }

        let now = self.time_provider.now_millis();
        let user = User {
            id: self.id_provider.generate_id(),
            provider_id: req.provider_id,
            username: req.username,
            display_name: req.display_name,
            bio: None,
            avatar_url: None,
            role: Role::Member,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_user(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    pub async fn create_post(&self, author_id: &str, req: NewPost) -> Result<Post> {
        validation::non_blank("song_id", &req.song_id, validation::MAX_TITLE_LEN)?;
        validation::non_blank("title", &req.title, validation::MAX_TITLE_LEN)?;
        if let Some(body) = &req.body {
            validation::max_chars("body", body, validation::MAX_POST_BODY_LEN)?;
        }
        validation::rating(req.rating)?;
        self.require_user(author_id).await?;

        let now = self.time_provider.now_millis();
        let post = Post {
            id: self.id_provider.generate_id(),
            author_id: author_id.to_string(),
            song_id: req.song_id,
            title: req.title,
            body: req.body,
            rating: req.rating,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_post(&post).await?;

        info!(post_id = %post.id, author_id, song_id = %post.song_id, "Post created");
        Ok(post)
    }

    pub async fn create_comment(&self, author_id: &str, post_id: &str, body: String) -> Result<Comment> {
        validation::non_blank("body", &body, validation::MAX_COMMENT_LEN)?;
        self.require_user(author_id).await?;
        if self.repo.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {post_id}")));
        }

        let now = self.time_provider.now_millis();
        let comment = Comment {
            id: self.id_provider.generate_id(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            body,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_comment(&comment).await?;

        info!(comment_id = %comment.id, post_id, author_id, "Comment created");
        Ok(comment)
    }

    /// Post with its current like/dislike counts
    pub async fn get_post(&self, post_id: &str) -> Result<PostView> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;
        let votes = self
            .repo
            .vote_counts(&VoteTarget::Post(post.id.clone()))
            .await?;
        Ok(PostView { post, votes })
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))
    }

    pub async fn list_posts_by_author(&self, author_id: &str, limit: i64, offset: i64) -> Result<Vec<Post>> {
        validation::page(limit, offset)?;
        self.repo.list_posts_by_author(author_id, limit, offset).await
    }

    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        self.repo.list_comments(post_id).await
    }

    async fn require_user(&self, user_id: &str) -> Result<()> {
        match self.repo.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("user {user_id}"))),
        }
    }
}
