//! Generative-service adapter for the Sentinel CAD simulation.
//!
//! Everything the simulation asks an external language model for goes
//! through this crate: case generation, phone-call roleplay, the CAD
//! assistant, and supervisor review. It is the single point where untyped
//! external text crosses into the typed core, so parsing, validation, and
//! verdict classification all live here.
//!
//! The live path renders `minijinja` prompt templates and talks to an
//! OpenAI-compatible or Anthropic backend over `reqwest`; the scripted
//! path serves deterministic canned responses for tests and offline runs.

pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod service;
pub mod verdict;

pub use config::{BackendType, GenConfig, LlmBackendConfig};
pub use error::GenError;
pub use llm::{LlmBackend, create_backend};
pub use parse::{SCENE_IMAGES, parse_case};
pub use prompt::{PromptEngine, RenderedPrompt, TEMPLATE_NAMES};
pub use service::{GenerativeClient, GenerativeService, ScriptedService};
pub use verdict::{APPROVAL_MARKERS, classify_verdict};
