//! Branching-narrative navigation engine.
//!
//! A user supplies a subject, a remote storyteller generates a directed
//! graph of scenes, and a session walks that graph one choice at a time
//! with the ability to step back. This crate owns:
//! - The immutable story graph model
//! - Per-scene visual seeding for stable image rendering
//! - The history-stack navigation engine
//! - Lookahead image prefetch over an injectable port
//! - The Idle/Loading/Playing session state machine tying them together
//!
//! # Quick start
//!
//! ```ignore
//! use tale_core::StorySession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = StorySession::from_env()?;
//!     session.start("Haunted Space Station").await?;
//!
//!     if let Some(scene) = session.current_node() {
//!         println!("{}", scene.text);
//!         for (i, choice) in session.offered_choices().iter().enumerate() {
//!             println!("  {}. {}", i + 1, choice.text);
//!         }
//!     }
//!
//!     session.choose(0);
//!     Ok(())
//! }
//! ```

pub mod graph;
pub mod navigation;
pub mod prefetch;
pub mod seeds;
pub mod session;
pub mod storyteller;
pub mod testing;

// Primary public API
pub use graph::{NodeId, StoryChoice, StoryGraph, StoryNode};
pub use navigation::{BackStep, NavigationError, Navigator};
pub use prefetch::{image_for, ImagePrefetcher, PrefetchPolicy};
pub use seeds::{SeedTable, SEED_MAX};
pub use session::{Phase, SessionError, StorySession};
pub use storyteller::{GeminiStoryteller, GenerationError, StoryGenerator, StorytellerConfig};
