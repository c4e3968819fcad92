//! Prompt template loading and rendering via `minijinja`.
//!
//! Templates are loaded from the filesystem (default:
//! `crates/sentinel-gen/templates/`) so the scenario writing can be tuned
//! without recompiling. One template exists per service operation: case
//! generation, phone-call roleplay, the CAD assistant, and the supervisor
//! review.

use minijinja::Environment;

use crate::error::GenError;

/// Template names the engine loads at startup, one `.j2` file each.
pub const TEMPLATE_NAMES: [&str; 4] = ["case", "call", "helper", "review"];

/// Manages prompt template loading and rendering.
///
/// Wraps a `minijinja` [`Environment`] with all service prompt templates
/// pre-loaded. Templates can be edited on disk and will be picked up on
/// the next call to [`PromptEngine::new`].
pub struct PromptEngine {
    env: Environment<'static>,
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message establishing the roleplay frame.
    pub system: String,
    /// User message carrying the operation payload.
    pub user: String,
    /// Whether the backend should be asked for a JSON-object response.
    pub expects_json: bool,
    /// Sampling temperature.
    pub temperature: f32,
    /// Response token budget.
    pub max_tokens: u32,
}

impl RenderedPrompt {
    /// A prompt expecting a structured JSON case document.
    pub fn structured(system: impl Into<String>, user: String) -> Self {
        Self {
            system: system.into(),
            user,
            expects_json: true,
            temperature: 0.9,
            max_tokens: 2048,
        }
    }

    /// A prompt expecting a short spoken-style text reply.
    pub fn spoken(system: impl Into<String>, user: String) -> Self {
        Self {
            system: system.into(),
            user,
            expects_json: false,
            temperature: 0.7,
            max_tokens: 256,
        }
    }
}

impl PromptEngine {
    /// Create a new prompt engine loading templates from the given directory.
    ///
    /// The directory must contain `case.j2`, `call.j2`, `helper.j2`, and
    /// `review.j2`.
    pub fn new(templates_dir: &str) -> Result<Self, GenError> {
        let mut env = Environment::new();

        for name in TEMPLATE_NAMES {
            let source = load_template(templates_dir, &format!("{name}.j2"))?;
            env.add_template_owned(name.to_owned(), source)
                .map_err(|e| GenError::Template(format!("failed to add {name} template: {e}")))?;
        }

        Ok(Self { env })
    }

    /// Render a named template with the given context.
    pub fn render(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> Result<String, GenError> {
        self.env
            .get_template(name)
            .map_err(|e| GenError::Template(format!("missing {name} template: {e}")))?
            .render(context)
            .map_err(|e| GenError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, GenError> {
    let path = format!("{dir}/{filename}");
    std::fs::read_to_string(&path)
        .map_err(|e| GenError::Template(format!("failed to read {path}: {e}")))
}
