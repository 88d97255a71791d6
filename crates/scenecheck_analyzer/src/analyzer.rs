//! The semantic analyzer seam.

use async_trait::async_trait;
use derive_getters::Getters;
use scenecheck_core::{EntityId, Finding, SceneId};
use scenecheck_error::AnalyzerResult;
use serde::{Deserialize, Serialize};

/// Which judgment an analysis request asks for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnalysisKind {
    /// Does the scene follow from the scenes before it
    Narrative,
    /// Does a character's line sound like that character
    Dialogue,
    /// Does a character's emotional state follow from earlier ones
    Emotion,
}

impl AnalysisKind {
    /// Rule id of findings produced by this kind of analysis.
    pub fn rule_id(self) -> &'static str {
        match self {
            AnalysisKind::Narrative => SEMANTIC_COHERENCE_RULE,
            AnalysisKind::Dialogue => SEMANTIC_DIALOGUE_RULE,
            AnalysisKind::Emotion => SEMANTIC_EMOTION_RULE,
        }
    }
}

/// Rule id of narrative coherence findings.
pub const SEMANTIC_COHERENCE_RULE: &str = "semantic-coherence";

/// Rule id of dialogue consistency findings.
pub const SEMANTIC_DIALOGUE_RULE: &str = "semantic-dialogue";

/// Rule id of emotional continuity findings.
pub const SEMANTIC_EMOTION_RULE: &str = "semantic-emotional-continuity";

/// Earlier material the analyzer sees as context: a scene description, a
/// line of dialogue or an emotional state, tagged with its scene.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PrecedingScene {
    scene_id: SceneId,
    text: String,
}

impl PrecedingScene {
    /// Create a context entry.
    pub fn new(scene_id: impl Into<SceneId>, text: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            text: text.into(),
        }
    }
}

/// One piece of scene text with the material that leads up to it.
///
/// Narrative requests carry the scene description. Dialogue and emotion
/// requests carry one character's line or emotional state and name that
/// character as the subject.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AnalysisRequest {
    kind: AnalysisKind,
    scene_id: SceneId,
    subject: Option<EntityId>,
    text: String,
    preceding: Vec<PrecedingScene>,
}

impl AnalysisRequest {
    /// Narrative request for a scene description, with no preceding context.
    pub fn new(scene_id: impl Into<SceneId>, text: impl Into<String>) -> Self {
        Self {
            kind: AnalysisKind::Narrative,
            scene_id: scene_id.into(),
            subject: None,
            text: text.into(),
            preceding: Vec::new(),
        }
    }

    /// Dialogue request for one line spoken by `speaker`.
    pub fn dialogue(
        scene_id: impl Into<SceneId>,
        speaker: impl Into<EntityId>,
        line: impl Into<String>,
    ) -> Self {
        Self {
            kind: AnalysisKind::Dialogue,
            subject: Some(speaker.into()),
            ..Self::new(scene_id, line)
        }
    }

    /// Emotion request for the state `character` is in.
    pub fn emotion(
        scene_id: impl Into<SceneId>,
        character: impl Into<EntityId>,
        emotion: impl Into<String>,
    ) -> Self {
        Self {
            kind: AnalysisKind::Emotion,
            subject: Some(character.into()),
            ..Self::new(scene_id, emotion)
        }
    }

    /// Attach preceding context, oldest first.
    pub fn with_preceding(mut self, preceding: Vec<PrecedingScene>) -> Self {
        self.preceding = preceding;
        self
    }
}

/// External judgment of scene text.
///
/// Implementations return findings as they see fit; the validator passes them
/// through unchanged. Errors never abort a validation run.
#[async_trait]
pub trait SemanticAnalyzer: Send + Sync {
    /// Analyzer name for logs.
    fn name(&self) -> &str;

    /// Analyze one request.
    async fn analyze(&self, request: &AnalysisRequest) -> AnalyzerResult<Vec<Finding>>;
}
