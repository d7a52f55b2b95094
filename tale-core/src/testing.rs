//! Testing utilities for the story engine.
//!
//! This module provides tools for integration testing:
//! - `MockStoryteller` for deterministic sessions without API calls
//! - `RecordingPrefetcher` to observe what the prefetch policy warms
//! - Ready-made story graphs and assertion helpers

use crate::graph::{StoryGraph, StoryNode};
use crate::prefetch::ImagePrefetcher;
use crate::session::StorySession;
use crate::storyteller::{GenerationError, StoryGenerator};
use async_trait::async_trait;
use pollinations::ImageRequest;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted generation outcome.
#[derive(Debug, Clone)]
enum Scripted {
    Graph(StoryGraph),
    Failure(String),
}

/// A story generator that returns scripted results.
///
/// Queued results are consumed in order; once the queue runs dry the
/// fallback graph (if any) is repeated, otherwise generation fails.
#[derive(Default)]
pub struct MockStoryteller {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Option<StoryGraph>,
    calls: AtomicUsize,
}

impl MockStoryteller {
    /// Generator with no script: every call fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that always returns clones of the given graph.
    pub fn with_graph(graph: StoryGraph) -> Self {
        Self {
            fallback: Some(graph),
            ..Self::default()
        }
    }

    /// Generator that always fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        let mock = Self::default();
        mock.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
        mock
    }

    /// Queue a graph to return on the next unanswered call.
    pub fn queue_graph(self, graph: StoryGraph) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Graph(graph));
        self
    }

    /// Queue a failure to return on the next unanswered call.
    pub fn queue_failure(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
        self
    }

    /// How many times `generate` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryGenerator for MockStoryteller {
    async fn generate(&self, _subject: &str) -> Result<StoryGraph, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Graph(graph)) => Ok(graph),
            Some(Scripted::Failure(message)) => Err(GenerationError::Unusable(message)),
            None => match &self.fallback {
                Some(graph) => Ok(graph.clone()),
                None => Err(GenerationError::Unusable(
                    "no scripted story left".to_string(),
                )),
            },
        }
    }
}

/// Prefetch port that records every descriptor instead of doing network IO.
#[derive(Debug, Default)]
pub struct RecordingPrefetcher {
    warmed: Mutex<Vec<ImageRequest>>,
}

impl RecordingPrefetcher {
    /// Create a recorder, shared so the test keeps a handle after wiring it
    /// into a session.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every descriptor warmed so far, in order.
    pub fn warmed(&self) -> Vec<ImageRequest> {
        self.warmed.lock().unwrap().clone()
    }

    /// The warmed descriptors rendered to URLs.
    pub fn warmed_urls(&self) -> Vec<String> {
        self.warmed
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.url().to_string())
            .collect()
    }
}

impl ImagePrefetcher for RecordingPrefetcher {
    fn warm(&self, request: &ImageRequest) {
        self.warmed.lock().unwrap().push(request.clone());
    }
}

/// The minimal two-scene story: "a" offers one choice into the ending "b".
pub fn sample_story() -> StoryGraph {
    StoryGraph::from_nodes(
        "T",
        "a",
        vec![
            StoryNode::new("a", "You stand at the gate.", "an iron gate in fog")
                .with_choice("go", "b"),
            StoryNode::new("b", "The gate closes behind you.", "a closing gate")
                .ending(),
        ],
    )
}

/// A branching story with a cycle and an ending, used across the
/// integration suites.
pub fn branching_story() -> StoryGraph {
    StoryGraph::from_nodes(
        "The Crossing",
        "start",
        vec![
            StoryNode::new("start", "A river splits the road.", "a river at dawn")
                .with_choice("Take the bridge", "bridge")
                .with_choice("Wade across", "ford"),
            StoryNode::new("bridge", "The planks groan underfoot.", "a rope bridge")
                .with_choice("Keep going", "far-bank")
                .with_choice("Turn back", "start"),
            StoryNode::new("ford", "The current drags at your knees.", "dark rushing water")
                .with_choice("Push on", "far-bank"),
            StoryNode::new("far-bank", "You reach the far bank.", "a quiet shore").ending(),
        ],
    )
}

/// Session wired to the given generator and a recording prefetcher.
pub fn session_with(generator: MockStoryteller) -> (StorySession, Arc<RecordingPrefetcher>) {
    let recorder = RecordingPrefetcher::new();
    let session = StorySession::new(Box::new(generator), recorder.clone());
    (session, recorder)
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert the session's history depth.
#[track_caller]
pub fn assert_depth(session: &StorySession, expected: usize) {
    let actual = session.depth();
    assert_eq!(actual, expected, "expected depth {expected}, got {actual}");
}

/// Assert the id of the session's current scene.
#[track_caller]
pub fn assert_current(session: &StorySession, expected: &str) {
    let actual = session
        .current_node()
        .unwrap_or_else(|| panic!("expected to be at '{expected}', but no story is playing"));
    assert_eq!(
        actual.id.as_str(),
        expected,
        "expected current scene '{expected}', got '{}'",
        actual.id
    );
}
