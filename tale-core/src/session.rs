//! Session state machine.
//!
//! One session owns the whole Idle → Loading → Playing lifecycle: it asks
//! the generator for a graph, stamps every scene with a seed, initializes
//! navigation, and routes user commands while playing. All state lives in
//! the session and is handed to consumers by reference; there are no
//! ambient globals, and the graph/seeds/history triple is only ever
//! mutated by the session's own command processing.

use crate::graph::{NodeId, StoryChoice, StoryGraph, StoryNode};
use crate::navigation::{BackStep, Navigator};
use crate::prefetch::{image_for, ImagePrefetcher, PrefetchPolicy};
use crate::seeds::SeedTable;
use crate::storyteller::{validate_story, GeminiStoryteller, GenerationError, StoryGenerator};
use pollinations::{ImageRequest, Pollinations};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to the session's caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("story generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The start request carried a blank subject.
    #[error("enter a subject to begin")]
    EmptySubject,
}

/// Which phase the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No story loaded; waiting for a subject.
    Idle,
    /// A generation request is in flight. Choice and back inputs are
    /// unreachable until it settles.
    Loading,
    /// A story is loaded and being traversed.
    Playing,
}

/// Everything that exists only while a story is being played.
struct PlayState {
    graph: StoryGraph,
    seeds: SeedTable,
    navigator: Navigator,
    prefetch: PrefetchPolicy,
}

impl PlayState {
    fn current(&self) -> &StoryNode {
        self.navigator.current_node(&self.graph)
    }

    /// Warm the images reachable from the current scene.
    fn warm_current(&mut self) {
        let node = self.navigator.current_node(&self.graph);
        self.prefetch.warm_choices(&self.graph, node, &self.seeds);
    }
}

enum State {
    Idle,
    Loading { epoch: u64 },
    Playing(PlayState),
}

/// Token tying a generation round-trip to the loading epoch it started in.
struct LoadToken {
    epoch: u64,
}

/// Interactive story session.
///
/// Commands are processed strictly sequentially; the only suspension point
/// is the outbound generation call inside [`start`](Self::start).
pub struct StorySession {
    generator: Box<dyn StoryGenerator>,
    prefetcher: Arc<dyn ImagePrefetcher>,
    state: State,
    epoch: u64,
    last_error: Option<String>,
}

impl StorySession {
    /// Create a session over the given generation and prefetch boundaries.
    pub fn new(generator: Box<dyn StoryGenerator>, prefetcher: Arc<dyn ImagePrefetcher>) -> Self {
        Self {
            generator,
            prefetcher,
            state: State::Idle,
            epoch: 0,
            last_error: None,
        }
    }

    /// Production wiring: Gemini storyteller and pollinations prefetcher.
    ///
    /// Requires the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, SessionError> {
        Ok(Self::new(
            Box::new(GeminiStoryteller::from_env()?),
            Arc::new(Pollinations::new()),
        ))
    }

    /// Start a new story for `subject`.
    ///
    /// A no-op while loading or playing. Blank subjects are rejected before
    /// any remote work happens. On failure the session returns to idle and
    /// retains a user-visible message until dismissed or the next start.
    pub async fn start(&mut self, subject: &str) -> Result<(), SessionError> {
        let subject = subject.trim().to_string();
        if subject.is_empty() {
            return Err(SessionError::EmptySubject);
        }

        let Some(token) = self.begin_loading() else {
            debug!(%subject, "ignoring start request while busy");
            return Ok(());
        };

        let result = self.generator.generate(&subject).await;
        self.apply_generation(token, result)
    }

    /// Enter the loading phase, or refuse because the session is busy.
    fn begin_loading(&mut self) -> Option<LoadToken> {
        if !matches!(self.state, State::Idle) {
            return None;
        }
        self.epoch += 1;
        self.last_error = None;
        self.state = State::Loading { epoch: self.epoch };
        Some(LoadToken { epoch: self.epoch })
    }

    /// Apply the outcome of a generation round-trip.
    ///
    /// A result from a superseded loading epoch is discarded rather than
    /// applied. The user has already abandoned that session.
    fn apply_generation(
        &mut self,
        token: LoadToken,
        result: Result<StoryGraph, GenerationError>,
    ) -> Result<(), SessionError> {
        let live = matches!(self.state, State::Loading { epoch } if epoch == token.epoch);
        if !live {
            debug!(epoch = token.epoch, "discarding stale generation result");
            return Ok(());
        }

        match self.load_graph(result) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.state = State::Idle;
                Err(err.into())
            }
        }
    }

    fn load_graph(
        &mut self,
        result: Result<StoryGraph, GenerationError>,
    ) -> Result<(), GenerationError> {
        let graph = result?;
        validate_story(&graph)?;
        let navigator =
            Navigator::start(&graph).map_err(|err| GenerationError::Unusable(err.to_string()))?;
        let seeds = SeedTable::assign(graph.node_ids());

        let mut play = PlayState {
            graph,
            seeds,
            navigator,
            prefetch: PrefetchPolicy::new(self.prefetcher.clone()),
        };
        play.warm_current();
        self.state = State::Playing(play);
        Ok(())
    }

    /// Follow the choice at `index` among the current scene's offered
    /// choices.
    ///
    /// Absorbing boundary: out-of-range indexes and broken links leave the
    /// session exactly where it was; the user just sees no navigation
    /// happen. Only meaningful while playing.
    pub fn choose(&mut self, index: usize) {
        let State::Playing(play) = &mut self.state else {
            return;
        };

        let Some(choice) = play.current().offered_choices().get(index).cloned() else {
            debug!(index, "ignoring out-of-range choice");
            return;
        };

        // A broken link was already reported by the navigator; history is
        // untouched, so there is nothing new to warm.
        if play.navigator.choose(&play.graph, &choice).is_ok() {
            play.warm_current();
        }
    }

    /// Step back one scene.
    ///
    /// At the start node nothing moves; [`BackStep::AtStart`] tells the
    /// caller to run its exit confirmation instead. Outside of play this
    /// also reports `AtStart` and changes nothing.
    pub fn back(&mut self) -> BackStep {
        match &mut self.state {
            State::Playing(play) => {
                let step = play.navigator.back();
                if step == BackStep::SteppedBack {
                    play.warm_current();
                }
                step
            }
            _ => BackStep::AtStart,
        }
    }

    /// Tear the session down after the user confirmed leaving the story at
    /// its start node. History and the graph are discarded.
    pub fn confirm_exit(&mut self) {
        self.reset();
    }

    /// Discard the finished story and return to the start screen.
    pub fn restart(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        // Bumping the epoch invalidates any generation still in flight.
        self.epoch += 1;
        self.state = State::Idle;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Which phase the session is in.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Loading { .. } => Phase::Loading,
            State::Playing(_) => Phase::Playing,
        }
    }

    /// Title of the loaded story.
    pub fn title(&self) -> Option<&str> {
        self.play().map(|play| play.graph.title.as_str())
    }

    /// The current scene, while playing.
    pub fn current_node(&self) -> Option<&StoryNode> {
        self.play().map(PlayState::current)
    }

    /// Choices offered for the current scene. Empty for endings and outside
    /// of play.
    pub fn offered_choices(&self) -> &[StoryChoice] {
        self.play()
            .map(|play| play.current().offered_choices())
            .unwrap_or(&[])
    }

    /// Whether the current scene terminates the story.
    ///
    /// True for flagged endings and for scenes with no choices at all. The
    /// latter is a generator defect treated as an implicit ending rather
    /// than a dead end.
    pub fn at_ending(&self) -> bool {
        self.current_node()
            .is_some_and(|node| node.is_ending || node.choices.is_empty())
    }

    /// Number of scenes in history, i.e. the current depth.
    pub fn depth(&self) -> usize {
        self.play().map_or(0, |play| play.navigator.depth())
    }

    /// Visited scene ids, oldest first.
    pub fn history(&self) -> &[NodeId] {
        self.play().map_or(&[], |play| play.navigator.history())
    }

    /// Seed assigned to a scene of the loaded story.
    pub fn seed_for(&self, id: &NodeId) -> Option<u32> {
        self.play().and_then(|play| play.seeds.get(id))
    }

    /// Display descriptor for the current scene's image.
    pub fn current_image(&self) -> Option<ImageRequest> {
        self.play()
            .and_then(|play| image_for(play.current(), &play.seeds))
    }

    /// Message from the most recent failed load, until dismissed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Dismiss the retained error message.
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn play(&self) -> Option<&PlayState> {
        match &self.state {
            State::Playing(play) => Some(play),
            _ => None,
        }
    }
}
