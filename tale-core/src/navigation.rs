//! Story traversal and history.
//!
//! The navigator owns the history stack: one entry per visited scene, the
//! current scene always on top. Forward navigation validates its target
//! before pushing, because targets come from an untrusted generator.
//! Stepping back below the start node is reported to the caller instead of
//! performed: leaving the story needs user confirmation, which lives above
//! this layer.

use crate::graph::{NodeId, StoryChoice, StoryGraph, StoryNode};
use thiserror::Error;
use tracing::warn;

/// Errors from navigation operations.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// A choice pointed at a scene the graph does not contain.
    ///
    /// This is a defect in the generated story, not a user error; the
    /// navigation that reported it was a no-op.
    #[error("choice targets unknown node '{0}'")]
    BrokenLink(NodeId),

    /// The graph's start node id does not resolve.
    #[error("start node '{0}' is not present in the story")]
    MissingStart(NodeId),
}

/// Result of a back-step request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackStep {
    /// Popped one entry; the previous scene is current again.
    SteppedBack,
    /// Already at the start node; history untouched. Whether to leave the
    /// story entirely is the caller's decision.
    AtStart,
}

/// History-stack navigator over a story graph.
///
/// Holds only the visited ids. The graph is passed into each operation so
/// a session can own both side by side; every id in history was validated
/// against that graph when it was pushed.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<NodeId>,
}

impl Navigator {
    /// Start a traversal at the graph's start node.
    pub fn start(graph: &StoryGraph) -> Result<Self, NavigationError> {
        if !graph.contains(&graph.start_node_id) {
            return Err(NavigationError::MissingStart(graph.start_node_id.clone()));
        }
        Ok(Self {
            history: vec![graph.start_node_id.clone()],
        })
    }

    /// Id of the current scene (the top of the stack).
    pub fn current(&self) -> &NodeId {
        self.history
            .last()
            .expect("history holds at least the start node")
    }

    /// Resolve the current scene.
    ///
    /// History only ever contains validated ids, so a miss here means the
    /// graph changed underneath us. That is a programming error, not a
    /// recoverable state, and it stops loudly.
    pub fn current_node<'g>(&self, graph: &'g StoryGraph) -> &'g StoryNode {
        let id = self.current();
        graph
            .get(id)
            .unwrap_or_else(|| panic!("history entry '{id}' missing from graph"))
    }

    /// Follow a choice if its target resolves.
    ///
    /// Revisiting a scene pushes a new entry; no deduplication, cycles are
    /// allowed. A broken link leaves history untouched.
    pub fn choose(
        &mut self,
        graph: &StoryGraph,
        choice: &StoryChoice,
    ) -> Result<(), NavigationError> {
        if !graph.contains(&choice.target_id) {
            warn!(target_id = %choice.target_id, "ignoring choice with broken link");
            return Err(NavigationError::BrokenLink(choice.target_id.clone()));
        }
        self.history.push(choice.target_id.clone());
        Ok(())
    }

    /// Step back one scene, or report that we are at the start.
    pub fn back(&mut self) -> BackStep {
        if self.history.len() > 1 {
            self.history.pop();
            BackStep::SteppedBack
        } else {
            BackStep::AtStart
        }
    }

    /// Number of scenes in history, i.e. the current depth.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Visited ids, oldest first; the last entry is the current scene.
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StoryNode;

    fn two_scene_story() -> StoryGraph {
        StoryGraph::from_nodes(
            "T",
            "a",
            vec![
                StoryNode::new("a", "..", "..").with_choice("go", "b"),
                StoryNode::new("b", "..", "..").ending(),
            ],
        )
    }

    #[test]
    fn test_start_begins_at_start_node() {
        let graph = two_scene_story();
        let nav = Navigator::start(&graph).unwrap();

        assert_eq!(nav.current().as_str(), "a");
        assert_eq!(nav.current_node(&graph).id.as_str(), "a");
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_start_rejects_missing_start_node() {
        let graph = StoryGraph::from_nodes("T", "ghost", vec![StoryNode::new("a", "..", "..")]);
        let err = Navigator::start(&graph).unwrap_err();
        assert!(matches!(err, NavigationError::MissingStart(_)));
    }

    #[test]
    fn test_choose_then_back_roundtrip() {
        let graph = two_scene_story();
        let mut nav = Navigator::start(&graph).unwrap();
        let choice = graph.get(&"a".into()).unwrap().choices[0].clone();

        nav.choose(&graph, &choice).unwrap();
        assert_eq!(nav.current().as_str(), "b");
        assert_eq!(nav.history(), &["a".into(), "b".into()]);

        assert_eq!(nav.back(), BackStep::SteppedBack);
        assert_eq!(nav.current().as_str(), "a");
        assert_eq!(nav.history(), &["a".into()]);
    }

    #[test]
    fn test_depth_tracks_valid_choices() {
        let graph = StoryGraph::from_nodes(
            "T",
            "a",
            vec![
                StoryNode::new("a", "..", "..").with_choice("loop", "b"),
                StoryNode::new("b", "..", "..").with_choice("back around", "a"),
            ],
        );
        let mut nav = Navigator::start(&graph).unwrap();

        let to_b = StoryChoice::new("loop", "b");
        let to_a = StoryChoice::new("back around", "a");
        for (i, choice) in [&to_b, &to_a, &to_b, &to_a].into_iter().enumerate() {
            nav.choose(&graph, choice).unwrap();
            assert_eq!(nav.depth(), i + 2);
        }

        // The cycle pushed "a" twice more rather than reusing entries.
        assert_eq!(
            nav.history(),
            &["a".into(), "b".into(), "a".into(), "b".into(), "a".into()]
        );
    }

    #[test]
    fn test_broken_link_is_a_no_op() {
        let graph = two_scene_story();
        let mut nav = Navigator::start(&graph).unwrap();
        let before = nav.history().to_vec();

        let err = nav
            .choose(&graph, &StoryChoice::new("into the void", "missing"))
            .unwrap_err();

        assert!(matches!(err, NavigationError::BrokenLink(id) if id.as_str() == "missing"));
        assert_eq!(nav.history(), &before[..]);
        assert_eq!(nav.current().as_str(), "a");
    }

    #[test]
    fn test_back_at_start_does_not_mutate() {
        let graph = two_scene_story();
        let mut nav = Navigator::start(&graph).unwrap();

        assert_eq!(nav.back(), BackStep::AtStart);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.current().as_str(), "a");
    }

    #[test]
    fn test_choose_from_ending_succeeds_when_target_resolves() {
        // Terminal suppression is presentation policy (offered_choices);
        // the engine itself only validates resolvability.
        let graph = StoryGraph::from_nodes(
            "T",
            "end",
            vec![
                StoryNode::new("end", "..", "..")
                    .with_choice("secret", "a")
                    .ending(),
                StoryNode::new("a", "..", ".."),
            ],
        );
        let mut nav = Navigator::start(&graph).unwrap();
        let choice = StoryChoice::new("secret", "a");

        nav.choose(&graph, &choice).unwrap();
        assert_eq!(nav.current().as_str(), "a");
    }
}
