//! Partial updates against SQLite

mod common;

use common::Harness;
use encore_core::application::{CommentPatch, PostPatch, ProfilePatch};
use encore_core::query::PatchError;
use encore_core::AppError;
use serde_json::json;

#[tokio::test]
async fn test_patch_profile_touches_only_supplied_fields() {
    let h = Harness::in_memory().await;
    let user = h.user("listener").await;

    let updated = h
        .patches
        .patch_profile(
            &user.id,
            ProfilePatch {
                bio: Some("Mostly shoegaze.".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.bio.as_deref(), Some("Mostly shoegaze."));
    assert_eq!(updated.username, user.username);
    assert_eq!(updated.display_name, user.display_name);
    assert!(updated.updated_at >= user.updated_at);

    let stored = h.reviews.get_user(&user.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_patch_post_from_json() {
    let h = Harness::in_memory().await;
    let author = h.user("critic").await;
    let post = h.post(&author).await;

    let patch = PostPatch::from_json(json!({"rating": 10, "body": null})).unwrap();
    let updated = h.patches.patch_post(&author.id, &post.id, patch).await.unwrap();

    assert_eq!(updated.rating, 10);
    // null means "leave alone", not "set NULL"
    assert_eq!(updated.body, post.body);
    assert_eq!(updated.title, post.title);
}

#[tokio::test]
async fn test_patch_post_by_other_user_is_not_found() {
    let h = Harness::in_memory().await;
    let author = h.user("critic").await;
    let other = h.user("troll").await;
    let post = h.post(&author).await;

    let err = h
        .patches
        .patch_post(
            &other.id,
            &post.id,
            PostPatch {
                title: Some("pwned".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    let stored = h.reviews.get_post(&post.id).await.unwrap().post;
    assert_eq!(stored, post);
}

#[tokio::test]
async fn test_empty_patch_rejected() {
    let h = Harness::in_memory().await;
    let author = h.user("critic").await;
    let post = h.post(&author).await;

    let patch = PostPatch::from_json(json!({"title": null})).unwrap();
    let err = h.patches.patch_post(&author.id, &post.id, patch).await.unwrap_err();

    assert!(matches!(err, AppError::Patch(PatchError::NothingToUpdate)));
}

#[tokio::test]
async fn test_patch_comment() {
    let h = Harness::in_memory().await;
    let author = h.user("critic").await;
    let post = h.post(&author).await;
    let comment = h
        .reviews
        .create_comment(&author.id, &post.id, "teh best".to_string())
        .await
        .unwrap();

    let updated = h
        .patches
        .patch_comment(
            &author.id,
            &comment.id,
            CommentPatch {
                body: Some("the best".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.body, "the best");
    assert_eq!(updated.post_id, post.id);
    let listed = h.reviews.list_comments(&post.id).await.unwrap();
    assert_eq!(listed, vec![updated]);
}

#[tokio::test]
async fn test_out_of_range_rating_rejected() {
    let h = Harness::in_memory().await;
    let author = h.user("critic").await;
    let post = h.post(&author).await;

    let err = h
        .patches
        .patch_post(
            &author.id,
            &post.id,
            PostPatch {
                rating: Some(11),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}
