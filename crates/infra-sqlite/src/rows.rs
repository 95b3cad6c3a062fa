// SQLite row representations

use encore_core::domain::{Comment, Post, Role, User, Vote, VoteKind, VoteTarget};
use encore_core::error::{AppError, Result};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: String,
    provider_id: String,
    username: String,
    display_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    role: String,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    /// Fails on a role this build does not know rather than guessing one
    pub(crate) fn into_user(self) -> Result<User> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            AppError::Internal(format!("user {} has unknown role {:?}", self.id, self.role))
        })?;

        Ok(User {
            id: self.id,
            provider_id: self.provider_id,
            username: self.username,
            display_name: self.display_name,
            bio: self.bio,
            avatar_url: self.avatar_url,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PostRow {
    id: String,
    author_id: String,
    song_id: String,
    title: String,
    body: Option<String>,
    rating: i64,
    created_at: i64,
    updated_at: i64,
}

impl PostRow {
    pub(crate) fn into_post(self) -> Post {
        Post {
            id: self.id,
            author_id: self.author_id,
            song_id: self.song_id,
            title: self.title,
            body: self.body,
            rating: self.rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CommentRow {
    id: String,
    post_id: String,
    author_id: String,
    body: String,
    created_at: i64,
    updated_at: i64,
}

impl CommentRow {
    pub(crate) fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author_id: self.author_id,
            body: self.body,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VoteRow {
    user_id: String,
    target_type: String,
    target_id: String,
    kind: String,
    created_at: i64,
}

impl VoteRow {
    pub(crate) fn into_vote(self) -> Result<Vote> {
        let corrupt = |what: &str, value: &str| {
            AppError::Internal(format!("vote by {} has unknown {what} {value:?}", self.user_id))
        };

        let kind = VoteKind::parse(&self.kind).ok_or_else(|| corrupt("kind", &self.kind))?;
        let target = match self.target_type.as_str() {
            "POST" => VoteTarget::Post(self.target_id),
            "COMMENT" => VoteTarget::Comment(self.target_id),
            other => return Err(corrupt("target type", other)),
        };

        Ok(Vote {
            user_id: self.user_id,
            target,
            kind,
            created_at: self.created_at,
        })
    }
}
