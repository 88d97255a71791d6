//! Semantic scene analysis for SceneCheck.
//!
//! Narrative judgment ("does this scene still make sense after the ones
//! before it?") is delegated to an external service behind the
//! [`SemanticAnalyzer`] trait. Three kinds of judgment are requested
//! (see [`AnalysisKind`]): narrative coherence of a scene description,
//! consistency of a character's dialogue with their earlier lines, and
//! continuity of a character's emotional state. [`GeminiAnalyzer`] answers
//! all three through the `gemini-rust` client, and [`SemanticDispatcher`]
//! runs an analyzer over a project with bounded parallelism, a request quota,
//! per-call timeouts and an overall deadline.
//!
//! Analysis is advisory. A timeout or analyzer error for a scene becomes a
//! `semantic-analysis-unavailable` warning and the rest of the run continues.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod dispatcher;
mod gemini;

pub use analyzer::{
    AnalysisKind, AnalysisRequest, PrecedingScene, SEMANTIC_COHERENCE_RULE, SEMANTIC_DIALOGUE_RULE,
    SEMANTIC_EMOTION_RULE, SemanticAnalyzer,
};
pub use dispatcher::{
    DIALOGUE_METADATA, EMOTION_ATTRIBUTE, PRECEDING_CONTEXT, SEMANTIC_UNAVAILABLE_RULE,
    SemanticDispatcher, unavailable,
};
pub use gemini::{DEFAULT_MODEL, GeminiAnalyzer};
