// Column lists returned by patch statements, one per entity table

pub const USERS_TABLE: &str = "users";
pub const POSTS_TABLE: &str = "posts";
pub const COMMENTS_TABLE: &str = "comments";

pub const USER_COLUMNS: &[&str] = &[
    "id",
    "provider_id",
    "username",
    "display_name",
    "bio",
    "avatar_url",
    "role",
    "created_at",
    "updated_at",
];

pub const POST_COLUMNS: &[&str] = &[
    "id",
    "author_id",
    "song_id",
    "title",
    "body",
    "rating",
    "created_at",
    "updated_at",
];

pub const COMMENT_COLUMNS: &[&str] = &[
    "id",
    "post_id",
    "author_id",
    "body",
    "created_at",
    "updated_at",
];
