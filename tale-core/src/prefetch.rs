//! Lookahead image prefetch.
//!
//! Before the user commits to a choice, every reachable target's image is
//! requested through the [`ImagePrefetcher`] port so the renderer's cache
//! is warm by the time navigation happens. Strictly best-effort: nothing
//! waits on these requests, no failure escapes the boundary, and missing
//! targets are simply skipped.

use crate::graph::{StoryGraph, StoryNode};
use crate::seeds::SeedTable;
use pollinations::{ImageRequest, Pollinations};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Outbound port for warming rendered images.
///
/// Implementations must be fire-and-forget: return immediately and swallow
/// every failure.
pub trait ImagePrefetcher: Send + Sync {
    /// Request a warm render of the descriptor.
    fn warm(&self, request: &ImageRequest);
}

impl ImagePrefetcher for Pollinations {
    fn warm(&self, request: &ImageRequest) {
        Pollinations::warm(self, request);
    }
}

/// Derive the display descriptor for a scene.
///
/// `None` only when the seed table has no entry for the node, which means
/// the node is outside the loaded graph.
pub fn image_for(node: &StoryNode, seeds: &SeedTable) -> Option<ImageRequest> {
    seeds
        .get(&node.id)
        .map(|seed| ImageRequest::new(&node.image_prompt, seed))
}

/// Prefetch policy over a single loaded story.
///
/// Re-invoking for the same scene is safe; descriptors already issued this
/// story are remembered by URL and skipped.
pub struct PrefetchPolicy {
    port: Arc<dyn ImagePrefetcher>,
    seen: HashSet<String>,
}

impl PrefetchPolicy {
    /// Create a policy over the given port.
    pub fn new(port: Arc<dyn ImagePrefetcher>) -> Self {
        Self {
            port,
            seen: HashSet::new(),
        }
    }

    /// Warm the image of every resolvable choice target of `node`.
    pub fn warm_choices(&mut self, graph: &StoryGraph, node: &StoryNode, seeds: &SeedTable) {
        for choice in &node.choices {
            let Some(target) = graph.get(&choice.target_id) else {
                trace!(target_id = %choice.target_id, "skipping prefetch for broken link");
                continue;
            };
            let Some(request) = image_for(target, seeds) else {
                continue;
            };
            if self.seen.insert(request.url().to_string()) {
                self.port.warm(&request);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StoryNode;
    use crate::testing::RecordingPrefetcher;

    fn story() -> StoryGraph {
        StoryGraph::from_nodes(
            "T",
            "a",
            vec![
                StoryNode::new("a", "..", "crossroads at night")
                    .with_choice("left", "b")
                    .with_choice("right", "c")
                    .with_choice("off the map", "missing"),
                StoryNode::new("b", "..", "a misty forest"),
                StoryNode::new("c", "..", "a river of stars"),
            ],
        )
    }

    #[test]
    fn test_warms_every_resolvable_target() {
        let graph = story();
        let seeds = SeedTable::assign(graph.node_ids());
        let recorder = RecordingPrefetcher::new();
        let mut policy = PrefetchPolicy::new(recorder.clone());

        policy.warm_choices(&graph, graph.get(&"a".into()).unwrap(), &seeds);

        let warmed = recorder.warmed();
        assert_eq!(warmed.len(), 2);
        assert!(warmed.iter().any(|r| r.prompt().contains("misty forest")));
        assert!(warmed.iter().any(|r| r.prompt().contains("river of stars")));
    }

    #[test]
    fn test_targets_use_their_own_seeds() {
        let graph = story();
        let seeds = SeedTable::assign(graph.node_ids());
        let recorder = RecordingPrefetcher::new();
        let mut policy = PrefetchPolicy::new(recorder.clone());

        policy.warm_choices(&graph, graph.get(&"a".into()).unwrap(), &seeds);

        for request in recorder.warmed() {
            let id = if request.prompt().contains("misty") {
                "b"
            } else {
                "c"
            };
            assert_eq!(request.seed(), seeds.get(&id.into()).unwrap());
        }
    }

    #[test]
    fn test_repeat_invocations_deduplicate() {
        let graph = story();
        let seeds = SeedTable::assign(graph.node_ids());
        let recorder = RecordingPrefetcher::new();
        let mut policy = PrefetchPolicy::new(recorder.clone());
        let node = graph.get(&"a".into()).unwrap();

        policy.warm_choices(&graph, node, &seeds);
        policy.warm_choices(&graph, node, &seeds);
        policy.warm_choices(&graph, node, &seeds);

        assert_eq!(recorder.warmed().len(), 2);
    }

    #[test]
    fn test_scene_with_no_choices_warms_nothing() {
        let graph = story();
        let seeds = SeedTable::assign(graph.node_ids());
        let recorder = RecordingPrefetcher::new();
        let mut policy = PrefetchPolicy::new(recorder.clone());

        policy.warm_choices(&graph, graph.get(&"b".into()).unwrap(), &seeds);

        assert!(recorder.warmed().is_empty());
    }
}
