//! Bounded artifact lists, corruption self-healing, and quota behavior.

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use bottega::db::{MemoryBackend, StorageError, Store};
use bottega::models::{GenerationInputs, GenerationResult, VideoResult};
use common::sample_image;

fn story_at(tag: &str, seconds: i64) -> GenerationResult {
    GenerationResult {
        story: format!("story {tag}"),
        images: vec![],
        inputs: GenerationInputs {
            description: format!("product {tag}"),
            audience: "collectors".to_string(),
            platform: "Instagram".to_string(),
            aesthetic: "minimal".to_string(),
            generate_images: false,
            image: sample_image(),
        },
        created_at: Utc.timestamp_opt(seconds, 0).unwrap(),
    }
}

fn video_at(tag: &str, seconds: i64) -> VideoResult {
    VideoResult {
        id: tag.to_string(),
        created_at: Utc.timestamp_opt(seconds, 0).unwrap(),
        video_base64: "dmlkZW8=".to_string(),
        mime_type: "video/mp4".to_string(),
        prompt: format!("brief {tag}"),
        input_image: None,
        download_uri: "https://example.com/v.mp4".to_string(),
    }
}

#[tokio::test]
async fn story_list_is_capped_at_four_newest_first() {
    let store = Store::new(Arc::new(MemoryBackend::new()));

    for i in 1..=5 {
        store
            .push_story("mara@example.com", story_at(&format!("t{i}"), i))
            .await
            .unwrap();
    }

    let stories = store.stories_for_user("mara@example.com").await.unwrap();
    assert_eq!(stories.len(), 4);

    let tags: Vec<&str> = stories.iter().map(|s| s.story.as_str()).collect();
    assert_eq!(tags, vec!["story t5", "story t4", "story t3", "story t2"]);
}

#[tokio::test]
async fn video_list_is_capped_at_one() {
    let store = Store::new(Arc::new(MemoryBackend::new()));

    store
        .push_video("mara@example.com", video_at("first", 1))
        .await
        .unwrap();
    store
        .push_video("mara@example.com", video_at("second", 2))
        .await
        .unwrap();

    let videos = store.videos_for_user("mara@example.com").await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id, "second");
}

#[tokio::test]
async fn artifact_lists_are_per_user() {
    let store = Store::new(Arc::new(MemoryBackend::new()));

    store
        .push_story("a@example.com", story_at("a", 1))
        .await
        .unwrap();
    store
        .push_story("b@example.com", story_at("b", 2))
        .await
        .unwrap();

    assert_eq!(store.stories_for_user("a@example.com").await.unwrap().len(), 1);
    assert_eq!(store.stories_for_user("b@example.com").await.unwrap().len(), 1);
    assert!(store.stories_for_user("c@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn saved_story_round_trips_exactly() {
    let store = Store::new(Arc::new(MemoryBackend::new()));
    let original = story_at("rt", 42);

    store
        .push_story("mara@example.com", original.clone())
        .await
        .unwrap();

    let stories = store.stories_for_user("mara@example.com").await.unwrap();
    assert_eq!(stories[0].story, original.story);
    assert_eq!(stories[0].inputs, original.inputs);
}

#[tokio::test]
async fn corrupt_table_heals_to_empty_and_accepts_writes() {
    let backend = Arc::new(MemoryBackend::new());
    backend.put_raw("stories", "{ this is not json").await;

    let store = Store::new(backend);

    let stories = store.stories_for_user("mara@example.com").await.unwrap();
    assert!(stories.is_empty());

    store
        .push_story("mara@example.com", story_at("after-heal", 1))
        .await
        .unwrap();
    let stories = store.stories_for_user("mara@example.com").await.unwrap();
    assert_eq!(stories.len(), 1);
}

#[tokio::test]
async fn quota_exceeded_surfaces_storage_full() {
    let store = Store::new(Arc::new(MemoryBackend::with_quota(64)));

    let err = store
        .push_story("mara@example.com", story_at("too-big", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Full));
}
