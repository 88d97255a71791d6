//! Narrative, dialogue and emotion analysis through Gemini.

use crate::{AnalysisKind, AnalysisRequest, SemanticAnalyzer};
use async_trait::async_trait;
use gemini_rust::{Gemini, client::Model};
use scenecheck_core::{Finding, Severity};
use scenecheck_error::{AnalyzerError, AnalyzerErrorKind, AnalyzerResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;
use tracing::{debug, error, instrument};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: i32 = 1024;

/// Reply shape of the narrative prompt.
#[derive(Debug, Deserialize)]
struct NarrativeAssessment {
    is_coherent: bool,
    #[serde(default)]
    coherence_issues: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Reply shape of the dialogue and emotion prompts.
#[derive(Debug, Deserialize)]
struct ConsistencyAssessment {
    is_consistent: bool,
    #[serde(default)]
    inconsistency_reasons: Vec<String>,
    #[serde(default)]
    justification: Option<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Asks Gemini to judge scenes, dialogue lines and emotional states against
/// what came before them.
#[derive(Clone)]
pub struct GeminiAnalyzer {
    client: Gemini,
    model: String,
}

impl std::fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiAnalyzer {
    /// Create an analyzer with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the Gemini client cannot be built.
    pub fn new(api_key: &str, model: &str) -> AnalyzerResult<Self> {
        let client = Gemini::with_model(api_key, model_for(model))
            .map_err(|e| AnalyzerError::new(AnalyzerErrorKind::Unavailable(e.to_string())))?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    /// Create an analyzer reading the key from `GEMINI_API_KEY`.
    #[instrument(name = "gemini_analyzer_from_env")]
    pub fn from_env(model: &str) -> AnalyzerResult<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| AnalyzerError::new(AnalyzerErrorKind::MissingApiKey))?;
        Self::new(&api_key, model)
    }

    /// Model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Prompt sent for one request.
    pub fn prompt(request: &AnalysisRequest) -> String {
        match request.kind() {
            AnalysisKind::Narrative => Self::narrative_prompt(request),
            AnalysisKind::Dialogue => Self::dialogue_prompt(request),
            AnalysisKind::Emotion => Self::emotion_prompt(request),
        }
    }

    fn narrative_prompt(request: &AnalysisRequest) -> String {
        format!(
            "As an expert in narrative structure and screenplay analysis, assess the narrative \
             coherence of the following scene.\n\n\
             Previous scenes:\n{}\n\n\
             Current scene ({}):\n\"{}\"\n\n\
             Please analyze if the current scene maintains narrative coherence with the \
             established story. Consider plot progression, character motivations, and logical \
             continuity.\n\n\
             Provide your analysis in JSON format with the following structure:\n\
             {{\n  \"is_coherent\": true/false,\n  \"confidence_score\": (float between 0-1),\n  \
             \"coherence_issues\": [\"issue1\", \"issue2\"],\n  \
             \"suggestions\": [\"suggestion1\", \"suggestion2\"]\n}}",
            history(request, |scene_id, text| format!("- Scene {}: {}", scene_id, text)),
            request.scene_id(),
            request.text()
        )
    }

    fn dialogue_prompt(request: &AnalysisRequest) -> String {
        format!(
            "As an expert in screenplay analysis, assess the dialogue consistency for the \
             character {}.\n\n\
             Previous dialogue examples:\n{}\n\n\
             Current dialogue:\n\"{}\"\n\n\
             Please analyze if the current dialogue is consistent with the character's \
             established voice, vocabulary, speech patterns, and personality traits.\n\n\
             Provide your analysis in JSON format with the following structure:\n\
             {{\n  \"is_consistent\": true/false,\n  \"confidence_score\": (float between 0-1),\n  \
             \"inconsistency_reasons\": [\"reason1\", \"reason2\"],\n  \
             \"suggestions\": [\"suggestion1\", \"suggestion2\"]\n}}",
            subject(request),
            history(request, |_, text| format!("- {}", text)),
            request.text()
        )
    }

    fn emotion_prompt(request: &AnalysisRequest) -> String {
        format!(
            "As an expert in character psychology and narrative continuity, assess the emotional \
             continuity for the character {}.\n\n\
             Previous emotional states:\n{}\n\n\
             Current emotional state (scene {}):\n\"{}\"\n\n\
             Please analyze if the current emotional state is consistent with the character's \
             emotional arc and if the transition from previous emotions is plausible.\n\n\
             Provide your analysis in JSON format with the following structure:\n\
             {{\n  \"is_consistent\": true/false,\n  \"confidence_score\": (float between 0-1),\n  \
             \"inconsistency_reasons\": [\"reason1\", \"reason2\"],\n  \
             \"justification\": \"explanation of your reasoning\",\n  \
             \"suggestions\": [\"suggestion1\", \"suggestion2\"]\n}}",
            subject(request),
            history(request, |scene_id, text| format!("- Scene {}: {}", scene_id, text)),
            request.scene_id(),
            request.text()
        )
    }

    /// Turn the model's reply text into findings for `request`.
    ///
    /// The reply may wrap the JSON object in prose or code fences; everything
    /// from the first `{` to the last `}` is parsed.
    pub fn parse_reply(request: &AnalysisRequest, reply: &str) -> AnalyzerResult<Vec<Finding>> {
        let scene_id = request.scene_id();
        let (issues, suggestions, fallback) = match request.kind() {
            AnalysisKind::Narrative => {
                let assessment: NarrativeAssessment = extract_json(reply)?;
                let fallback = (!assessment.is_coherent).then(|| {
                    format!("Scene '{}' may not be coherent with the preceding scenes", scene_id)
                });
                let issues = assessment
                    .coherence_issues
                    .iter()
                    .map(|issue| format!("Scene '{}': {}", scene_id, issue))
                    .collect::<Vec<_>>();
                (issues, assessment.suggestions, fallback)
            }
            AnalysisKind::Dialogue => {
                let assessment: ConsistencyAssessment = extract_json(reply)?;
                let speaker = subject(request);
                let fallback = (!assessment.is_consistent).then(|| {
                    format!(
                        "Line of '{}' in scene '{}' does not match the character's voice",
                        speaker, scene_id
                    )
                });
                let issues = assessment
                    .inconsistency_reasons
                    .iter()
                    .map(|reason| {
                        format!("Dialogue of '{}' in scene '{}': {}", speaker, scene_id, reason)
                    })
                    .collect();
                (issues, assessment.suggestions, fallback)
            }
            AnalysisKind::Emotion => {
                let assessment: ConsistencyAssessment = extract_json(reply)?;
                let character = subject(request);
                let fallback = (!assessment.is_consistent).then(|| {
                    let mut message = format!(
                        "Emotional state '{}' of '{}' in scene '{}' does not follow from earlier scenes",
                        request.text(),
                        character,
                        scene_id
                    );
                    if let Some(justification) = &assessment.justification {
                        message.push_str(": ");
                        message.push_str(justification);
                    }
                    message
                });
                let issues = assessment
                    .inconsistency_reasons
                    .iter()
                    .map(|reason| {
                        format!("Emotion of '{}' in scene '{}': {}", character, scene_id, reason)
                    })
                    .collect();
                (issues, assessment.suggestions, fallback)
            }
        };

        let messages = if issues.is_empty() {
            fallback.into_iter().collect()
        } else {
            issues
        };
        let fix = (!suggestions.is_empty()).then(|| suggestions.join("; "));
        Ok(messages
            .into_iter()
            .map(|message| {
                let mut finding = Finding::new(request.kind().rule_id(), Severity::Warning, message)
                    .with_scenes([scene_id.clone()]);
                if let Some(entity) = request.subject() {
                    finding = finding.with_entity(entity.clone());
                }
                match &fix {
                    Some(fix) => finding.with_fix(fix.clone()),
                    None => finding,
                }
            })
            .collect())
    }
}

/// Gemini model id for a configured model name.
fn model_for(name: &str) -> Model {
    match name {
        "gemini-2.5-flash" => Model::Gemini25Flash,
        "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
        "gemini-2.5-pro" => Model::Gemini25Pro,
        other if other.starts_with("models/") => Model::Custom(other.to_string()),
        other => Model::Custom(format!("models/{}", other)),
    }
}

fn subject(request: &AnalysisRequest) -> String {
    request
        .subject()
        .as_ref()
        .map(|entity| entity.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn history(request: &AnalysisRequest, line: impl Fn(&str, &str) -> String) -> String {
    if request.preceding().is_empty() {
        return "(none)".to_string();
    }
    request
        .preceding()
        .iter()
        .map(|entry| line(entry.scene_id().as_str(), entry.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_json<T: DeserializeOwned>(reply: &str) -> AnalyzerResult<T> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        return Err(AnalyzerError::new(AnalyzerErrorKind::ResponseParse(
            "reply contains no JSON object".to_string(),
        )));
    };
    if end < start {
        return Err(AnalyzerError::new(AnalyzerErrorKind::ResponseParse(
            "reply contains no JSON object".to_string(),
        )));
    }
    serde_json::from_str(&reply[start..=end])
        .map_err(|e| AnalyzerError::new(AnalyzerErrorKind::ResponseParse(e.to_string())))
}

/// Classify a client error, keeping the HTTP status when the message has one.
fn classify(err: impl std::fmt::Display) -> AnalyzerError {
    let message = err.to_string();
    let status = message.find("code ").and_then(|at| {
        let digits: String = message[at + 5..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse::<u16>().ok()
    });
    match status {
        Some(status_code) => AnalyzerError::new(AnalyzerErrorKind::Http {
            status_code,
            message,
        }),
        None => AnalyzerError::new(AnalyzerErrorKind::Request(message)),
    }
}

#[async_trait]
impl SemanticAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(
        skip(self, request),
        fields(model = %self.model, kind = %request.kind(), scene = %request.scene_id())
    )]
    async fn analyze(&self, request: &AnalysisRequest) -> AnalyzerResult<Vec<Finding>> {
        let response = self
            .client
            .generate_content()
            .with_user_message(&Self::prompt(request))
            .with_temperature(TEMPERATURE)
            .with_max_output_tokens(MAX_OUTPUT_TOKENS)
            .execute()
            .await
            .map_err(|e| {
                error!("Gemini request failed: {}", e);
                classify(e)
            })?;

        let text = response.text();
        debug!(reply_len = text.len(), "Received Gemini reply");
        Self::parse_reply(request, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrecedingScene;

    #[test]
    fn test_prompt_lists_preceding_scenes() {
        let request = AnalysisRequest::new("s3", "Rex leaves the diner.").with_preceding(vec![
            PrecedingScene::new("s1", "Rex arrives."),
            PrecedingScene::new("s2", "Rex orders pie."),
        ]);
        let prompt = GeminiAnalyzer::prompt(&request);
        assert!(prompt.contains("- Scene s1: Rex arrives."));
        assert!(prompt.contains("- Scene s2: Rex orders pie."));
        assert!(prompt.contains("\"Rex leaves the diner.\""));
        assert!(prompt.contains("\"is_coherent\""));
    }

    #[test]
    fn test_dialogue_prompt_names_speaker_and_earlier_lines() {
        let request =
            AnalysisRequest::dialogue("s4", "john", "I've never cared about the stock market.")
                .with_preceding(vec![PrecedingScene::new(
                    "s2",
                    "The stock market crashed overnight.",
                )]);
        let prompt = GeminiAnalyzer::prompt(&request);
        assert!(prompt.contains("character john"));
        assert!(prompt.contains("- The stock market crashed overnight."));
        assert!(prompt.contains("\"inconsistency_reasons\""));
    }

    #[test]
    fn test_emotion_prompt_without_history() {
        let prompt = GeminiAnalyzer::prompt(&AnalysisRequest::emotion("s1", "rex", "furious"));
        assert!(prompt.contains("character rex"));
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("\"justification\""));
    }

    #[test]
    fn test_parse_reply_extracts_fenced_json() {
        let reply = "Here you go:\n```json\n{\"is_coherent\": false, \"confidence_score\": 0.7, \
                     \"coherence_issues\": [\"Rex was dead in s2\", \"Night became day\"], \
                     \"suggestions\": [\"Add a flashback marker\"]}\n```";
        let findings =
            GeminiAnalyzer::parse_reply(&AnalysisRequest::new("s3", "text"), reply).unwrap();

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule_id().as_str(), crate::SEMANTIC_COHERENCE_RULE);
        assert_eq!(*findings[0].severity(), Severity::Warning);
        assert_eq!(findings[0].suggested_fix().as_deref(), Some("Add a flashback marker"));
        assert!(findings[1].message().contains("Night became day"));
    }

    #[test]
    fn test_coherent_reply_yields_nothing() {
        let findings = GeminiAnalyzer::parse_reply(
            &AnalysisRequest::new("s1", "text"),
            r#"{"is_coherent": true, "coherence_issues": []}"#,
        )
        .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_incoherent_reply_without_issues_yields_one_finding() {
        let findings = GeminiAnalyzer::parse_reply(
            &AnalysisRequest::new("s1", "text"),
            r#"{"is_coherent": false}"#,
        )
        .unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].suggested_fix().is_none());
    }

    #[test]
    fn test_dialogue_reply_names_speaker() {
        let request = AnalysisRequest::dialogue("s4", "john", "Whatever.");
        let findings = GeminiAnalyzer::parse_reply(
            &request,
            r#"{"is_consistent": false, "inconsistency_reasons": ["John never shrugs things off"],
                "suggestions": ["Keep his anxious register"]}"#,
        )
        .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id().as_str(), crate::SEMANTIC_DIALOGUE_RULE);
        assert_eq!(findings[0].entity_id().as_ref().unwrap().as_str(), "john");
        assert!(findings[0].message().contains("shrugs"));
        assert_eq!(findings[0].suggested_fix().as_deref(), Some("Keep his anxious register"));
    }

    #[test]
    fn test_emotion_reply_without_reasons_uses_justification() {
        let request = AnalysisRequest::emotion("s5", "rex", "elated");
        let findings = GeminiAnalyzer::parse_reply(
            &request,
            r#"{"is_consistent": false, "justification": "He just lost his brother"}"#,
        )
        .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id().as_str(), crate::SEMANTIC_EMOTION_RULE);
        assert!(findings[0].message().contains("elated"));
        assert!(findings[0].message().contains("lost his brother"));
    }

    #[test]
    fn test_reply_without_json_is_parse_error() {
        let err = GeminiAnalyzer::parse_reply(&AnalysisRequest::new("s1", "text"), "I cannot help")
            .unwrap_err();
        assert!(matches!(err.kind(), AnalyzerErrorKind::ResponseParse(_)));
    }

    #[test]
    fn test_client_errors_keep_status_code() {
        let err = classify("bad response from server; code 503; description: overloaded");
        assert!(matches!(err.kind(), AnalyzerErrorKind::Http { status_code: 503, .. }));
        assert!(err.is_retryable());

        let err = classify("connection reset");
        assert!(matches!(err.kind(), AnalyzerErrorKind::Request(_)));
    }
}
