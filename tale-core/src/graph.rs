//! Immutable story graph model.
//!
//! A story is a directed graph of scenes produced by the remote generator:
//! nodes keyed by id, each carrying narrative text, an image prompt, an
//! ending flag, and an ordered list of choices pointing at other nodes.
//! The graph is replaced wholesale when a new story loads and never edited
//! in place. Lookups return `Option`: the generator is asked for closed
//! graphs but not trusted to produce them, so absence is an expected
//! outcome rather than an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a story node, as assigned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One selectable edge out of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChoice {
    /// Label shown to the user.
    pub text: String,
    /// Node this choice leads to.
    pub target_id: NodeId,
}

impl StoryChoice {
    /// Create a choice.
    pub fn new(text: impl Into<String>, target_id: impl Into<NodeId>) -> Self {
        Self {
            text: text.into(),
            target_id: target_id.into(),
        }
    }
}

/// A single scene in the story graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    pub id: NodeId,
    /// Narrative text for the scene.
    pub text: String,
    /// Visual description handed to the image renderer.
    pub image_prompt: String,
    /// Terminal scenes end the story; their choices are never offered.
    #[serde(default)]
    pub is_ending: bool,
    #[serde(default)]
    pub choices: Vec<StoryChoice>,
}

impl StoryNode {
    /// Create a scene with no choices.
    pub fn new(
        id: impl Into<NodeId>,
        text: impl Into<String>,
        image_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            image_prompt: image_prompt.into(),
            is_ending: false,
            choices: Vec::new(),
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, text: impl Into<String>, target_id: impl Into<NodeId>) -> Self {
        self.choices.push(StoryChoice::new(text, target_id));
        self
    }

    /// Mark the scene as an ending.
    pub fn ending(mut self) -> Self {
        self.is_ending = true;
        self
    }

    /// Choices actually offered to the user.
    ///
    /// Ending scenes offer none even when the generator attached some.
    /// This is the single place terminal suppression happens; every
    /// presentation layer is expected to go through it, while the
    /// navigation engine itself only ever checks target resolvability.
    pub fn offered_choices(&self) -> &[StoryChoice] {
        if self.is_ending {
            &[]
        } else {
            &self.choices
        }
    }
}

/// An immutable story produced by the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryGraph {
    pub title: String,
    pub start_node_id: NodeId,
    pub nodes: HashMap<NodeId, StoryNode>,
}

impl StoryGraph {
    /// Fold a generator node list into an id-keyed graph.
    ///
    /// The generator returns nodes as an array; later duplicates of an id
    /// win.
    pub fn from_nodes(
        title: impl Into<String>,
        start_node_id: impl Into<NodeId>,
        nodes: Vec<StoryNode>,
    ) -> Self {
        Self {
            title: title.into(),
            start_node_id: start_node_id.into(),
            nodes: nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect(),
        }
    }

    /// Look up a scene by id.
    pub fn get(&self, id: &NodeId) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    /// Whether the graph contains a scene with this id.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no scenes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All scene ids, in no particular order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Choice targets that do not resolve to a scene, as
    /// `(from, missing target)` pairs.
    ///
    /// Callers report these once at load time as defects in the generated
    /// story; they never reject it.
    pub fn dangling_links(&self) -> Vec<(&NodeId, &NodeId)> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.choices
                    .iter()
                    .filter(|choice| !self.contains(&choice.target_id))
                    .map(move |choice| (&node.id, &choice.target_id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let node: StoryNode = serde_json::from_value(json!({
            "id": "a",
            "text": "You wake in the dark.",
            "imagePrompt": "a dark room, single candle",
            "choices": [{"text": "Stand up", "targetId": "b"}]
        }))
        .unwrap();

        assert_eq!(node.id.as_str(), "a");
        assert_eq!(node.image_prompt, "a dark room, single candle");
        assert!(!node.is_ending);
        assert_eq!(node.choices[0].target_id, NodeId::from("b"));
    }

    #[test]
    fn test_ending_defaults_false_and_serializes_camel_case() {
        let node = StoryNode::new("end", "It is over.", "fading light").ending();
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["isEnding"], true);
        assert_eq!(value["imagePrompt"], "fading light");
    }

    #[test]
    fn test_from_nodes_keys_by_id_and_later_duplicates_win() {
        let graph = StoryGraph::from_nodes(
            "T",
            "a",
            vec![
                StoryNode::new("a", "first", "p1"),
                StoryNode::new("a", "second", "p2"),
                StoryNode::new("b", "other", "p3"),
            ],
        );

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get(&"a".into()).unwrap().text, "second");
    }

    #[test]
    fn test_lookup_absence_is_none() {
        let graph = StoryGraph::from_nodes("T", "a", vec![StoryNode::new("a", "..", "..")]);
        assert!(graph.get(&"missing".into()).is_none());
        assert!(!graph.contains(&"missing".into()));
    }

    #[test]
    fn test_offered_choices_suppressed_on_endings() {
        let node = StoryNode::new("end", "..", "..")
            .with_choice("ghost choice", "a")
            .ending();

        assert_eq!(node.choices.len(), 1);
        assert!(node.offered_choices().is_empty());
    }

    #[test]
    fn test_dangling_links() {
        let graph = StoryGraph::from_nodes(
            "T",
            "a",
            vec![
                StoryNode::new("a", "..", "..")
                    .with_choice("fine", "b")
                    .with_choice("broken", "nowhere"),
                StoryNode::new("b", "..", ".."),
            ],
        );

        let dangling = graph.dangling_links();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].0.as_str(), "a");
        assert_eq!(dangling[0].1.as_str(), "nowhere");
    }
}
