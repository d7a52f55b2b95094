//! Live tests against the real Gemini API.
//!
//! These verify the generation boundary end to end and cost real tokens.
//!
//! Run with: `GEMINI_API_KEY=$GEMINI_API_KEY cargo test -p tale-core --test live_storyteller -- --ignored --nocapture`

use tale_core::storyteller::validate_story;
use tale_core::{GeminiStoryteller, StoryGenerator};

/// Load environment variables from .env file.
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available.
fn has_api_key() -> bool {
    std::env::var("GEMINI_API_KEY").is_ok()
}

#[tokio::test]
#[ignore]
async fn test_generate_playable_story() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let storyteller = GeminiStoryteller::from_env().unwrap();
    let graph = storyteller
        .generate("a lighthouse at the end of the world")
        .await
        .expect("generation should succeed");

    println!("Title: {}", graph.title);
    println!("Scenes: {}", graph.len());
    for (from, target) in graph.dangling_links() {
        println!("  dangling: {from} -> {target}");
    }

    validate_story(&graph).expect("generated story should satisfy the contract");
    assert!(graph.len() >= 3, "expected at least 3 scenes");

    let start = graph.get(&graph.start_node_id).unwrap();
    assert!(!start.text.is_empty());
    assert!(!start.image_prompt.is_empty());

    // At least one scene should branch.
    assert!(
        graph.nodes.values().any(|node| node.choices.len() > 1),
        "expected a branching choice somewhere in the story"
    );
}
