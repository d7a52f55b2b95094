//! Image rendering boundary for pollinations.ai.
//!
//! The rendering service is addressed purely through its URL: a prompt in
//! the path plus dimensions, seed, and engine selection in the query. The
//! service treats identical URLs as idempotent (same descriptor, same
//! picture), so everything here is about deriving that URL exactly the same
//! way every time.
//!
//! The only network operation is [`Pollinations::warm`], a fire-and-forget
//! GET used to heat the service's cache before the user navigates to a
//! scene. Nothing waits on it and no failure escapes it.

use reqwest::Url;
use tracing::trace;

const API_BASE: &str = "https://image.pollinations.ai";

/// Quality suffix appended to every prompt.
const STYLE_SUFFIX: &str = "cinematic, atmospheric, high resolution, 8k";

/// Portrait dimensions used for every render.
const WIDTH: u32 = 720;
const HEIGHT: u32 = 1280;

/// Rendering engine selector.
const MODEL: &str = "flux";

/// A deterministic image request descriptor.
///
/// Two descriptors built from the same prompt and seed render to identical
/// URLs, which is what makes per-node images stable across re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRequest {
    prompt: String,
    seed: u32,
}

impl ImageRequest {
    /// Build a descriptor for a scene prompt and its assigned seed.
    ///
    /// The style suffix is appended here so every caller derives the same
    /// canonical prompt.
    pub fn new(prompt: &str, seed: u32) -> Self {
        Self {
            prompt: format!("{} {STYLE_SUFFIX}", prompt.trim()),
            seed,
        }
    }

    /// The full prompt, including the style suffix.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The seed this descriptor renders with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Render the canonical request URL.
    pub fn url(&self) -> Url {
        let mut url = Url::parse(API_BASE).expect("static base URL is valid");
        url.path_segments_mut()
            .expect("https URLs have path segments")
            .pop_if_empty()
            .push("prompt")
            .push(&self.prompt);
        url.query_pairs_mut()
            .append_pair("width", &WIDTH.to_string())
            .append_pair("height", &HEIGHT.to_string())
            .append_pair("nologo", "true")
            .append_pair("seed", &self.seed.to_string())
            .append_pair("model", MODEL);
        url
    }
}

/// Pollinations rendering client.
///
/// Only used to warm the rendering cache ahead of navigation; callers never
/// observe the outcome of a request.
#[derive(Clone)]
pub struct Pollinations {
    client: reqwest::Client,
}

impl Pollinations {
    /// Create a new client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Issue a fire-and-forget render request for the descriptor.
    ///
    /// Spawns onto the current tokio runtime and returns immediately. Every
    /// outcome, including transport errors, is swallowed after a trace log.
    pub fn warm(&self, request: &ImageRequest) {
        let client = self.client.clone();
        let url = request.url();
        tokio::spawn(async move {
            match client.get(url.clone()).send().await {
                Ok(response) => {
                    trace!(%url, status = %response.status(), "image warm request completed")
                }
                Err(err) => trace!(%url, %err, "image warm request failed"),
            }
        });
    }
}

impl Default for Pollinations {
    fn default() -> Self {
        Self::new()
    }
}
