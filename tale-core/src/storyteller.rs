//! Remote story generation.
//!
//! [`StoryGenerator`] is the port the session consumes: subject in, story
//! graph out, suspending until the remote call completes. The production
//! implementation, [`GeminiStoryteller`], prompts Gemini for a JSON story
//! graph constrained by a response schema, then folds the returned node
//! list into a [`StoryGraph`] and checks the contract the navigation
//! engine relies on.

use crate::graph::{NodeId, StoryGraph, StoryNode};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Errors from story generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("storyteller API error: {0}")]
    Api(#[from] gemini::Error),

    #[error("storyteller returned malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The generator answered, but with a graph the engine cannot play.
    #[error("generated story is unusable: {0}")]
    Unusable(String),
}

/// Port consumed by the session state machine.
///
/// Implementations should return a graph with a non-empty node set and a
/// resolvable start node, or a [`GenerationError`] explaining why they
/// could not; the session re-validates either way.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate a story graph for a subject.
    async fn generate(&self, subject: &str) -> Result<StoryGraph, GenerationError>;
}

#[async_trait]
impl<T: StoryGenerator + ?Sized> StoryGenerator for Arc<T> {
    async fn generate(&self, subject: &str) -> Result<StoryGraph, GenerationError> {
        (**self).generate(subject).await
    }
}

/// Configuration for the Gemini storyteller.
#[derive(Debug, Clone)]
pub struct StorytellerConfig {
    /// Model override (defaults to the client's model).
    pub model: Option<String>,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for StorytellerConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.8,
        }
    }
}

/// AI storyteller backed by the Gemini API.
pub struct GeminiStoryteller {
    client: gemini::Gemini,
    config: StorytellerConfig,
}

impl GeminiStoryteller {
    /// Create a storyteller with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: gemini::Gemini::new(api_key),
            config: StorytellerConfig::default(),
        }
    }

    /// Create a storyteller from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, GenerationError> {
        Ok(Self {
            client: gemini::Gemini::from_env()?,
            config: StorytellerConfig::default(),
        })
    }

    /// Configure the storyteller.
    pub fn with_config(mut self, config: StorytellerConfig) -> Self {
        self.config = config;
        self
    }

    fn system_prompt(subject: &str) -> String {
        format!(
            "You are an interactive fiction engine. Create a short, atmospheric story \
             about the user's subject, structured as a graph of scenes.\n\
             - Begin with an intro scene.\n\
             - Include at least 3-5 distinct scenes.\n\
             - At least one scene must offer a branching choice.\n\
             - Every targetId must exist in the nodes array.\n\
             - Keep scene text concise (under 50 words).\n\
             - Image prompts should be descriptive and artistic, with no text in the image.\n\
             - The theme is: {subject}"
        )
    }
}

#[async_trait]
impl StoryGenerator for GeminiStoryteller {
    async fn generate(&self, subject: &str) -> Result<StoryGraph, GenerationError> {
        let mut request = gemini::Request::new(format!("Generate a story about: {subject}"))
            .with_system(Self::system_prompt(subject))
            .with_temperature(self.config.temperature)
            .with_json_schema(story_schema());

        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }

        let response = self.client.generate(request).await?;
        parse_story(&response.text)
    }
}

/// Response schema the generator output must conform to.
fn story_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "Title of the generated story" },
            "startNodeId": { "type": "STRING", "description": "ID of the first scene" },
            "nodes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "text": {
                            "type": "STRING",
                            "description": "Narrative text for this scene (approx 30-50 words)"
                        },
                        "imagePrompt": {
                            "type": "STRING",
                            "description": "Visual description for image generation (no text in image)"
                        },
                        "isEnding": { "type": "BOOLEAN" },
                        "choices": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "text": { "type": "STRING" },
                                    "targetId": { "type": "STRING" }
                                },
                                "required": ["text", "targetId"]
                            }
                        }
                    },
                    "required": ["id", "text", "imagePrompt", "choices"]
                }
            }
        },
        "required": ["title", "startNodeId", "nodes"]
    })
}

/// Wire shape of a generated story: nodes arrive as an array and get folded
/// into the id-keyed graph.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedStory {
    title: String,
    start_node_id: NodeId,
    #[serde(default)]
    nodes: Vec<StoryNode>,
}

/// Parse generator output into a validated graph.
pub(crate) fn parse_story(text: &str) -> Result<StoryGraph, GenerationError> {
    let raw: GeneratedStory = serde_json::from_str(text)?;
    let graph = StoryGraph::from_nodes(raw.title, raw.start_node_id, raw.nodes);
    validate_story(&graph)?;
    Ok(graph)
}

/// Check the contract the navigation engine relies on: a non-empty node
/// set and a resolvable start node.
///
/// Dangling choice targets are reported here as defects but do not reject
/// the story; navigation re-validates every target before following it.
pub fn validate_story(graph: &StoryGraph) -> Result<(), GenerationError> {
    if graph.is_empty() {
        return Err(GenerationError::Unusable("story has no scenes".to_string()));
    }
    if !graph.contains(&graph.start_node_id) {
        return Err(GenerationError::Unusable(format!(
            "start node '{}' is missing from the story",
            graph.start_node_id
        )));
    }
    for (from, target_id) in graph.dangling_links() {
        warn!(%from, %target_id, "generated story contains a broken link");
    }
    Ok(())
}
