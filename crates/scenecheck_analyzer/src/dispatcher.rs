//! Fan-out of semantic analysis across scenes.
//!
//! Requests come from three places in a scene: its description (narrative),
//! the `dialogue` metadata list of `{"entity", "line"}` objects (dialogue) and
//! each referenced entity's `emotion` attribute (emotion).
//!
//! Calls run concurrently up to `max_concurrent_semantic_calls` (Tokio
//! semaphore), optionally under a requests-per-minute quota (governor). Each
//! call has its own timeout and the whole fan-out shares the caller's
//! deadline. A failed call becomes a warning finding for its scene; the
//! dispatcher itself never fails.

use crate::{AnalysisKind, AnalysisRequest, PrecedingScene, SemanticAnalyzer};
use futures::future::join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use scenecheck_core::{EntityId, Finding, Scene, SceneId, Severity, ValidationOptions};
use scenecheck_error::{AnalyzerError, AnalyzerErrorKind, AnalyzerResult};
use scenecheck_project::ProjectSnapshot;
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use strum::IntoEnumIterator;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rule id of the warning emitted when analysis of a scene fails.
pub const SEMANTIC_UNAVAILABLE_RULE: &str = "semantic-analysis-unavailable";

/// Number of preceding entries handed to the analyzer as context.
pub const PRECEDING_CONTEXT: usize = 5;

/// Scene metadata field holding the scene's dialogue lines.
pub const DIALOGUE_METADATA: &str = "dialogue";

/// Entity attribute holding a character's emotional state.
pub const EMOTION_ATTRIBUTE: &str = "emotion";

/// Runs a [`SemanticAnalyzer`] over every described scene of a snapshot.
#[derive(Clone)]
pub struct SemanticDispatcher {
    analyzer: Arc<dyn SemanticAnalyzer>,
    kinds: BTreeSet<AnalysisKind>,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
}

impl std::fmt::Debug for SemanticDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticDispatcher")
            .field("analyzer", &self.analyzer.name())
            .field("kinds", &self.kinds)
            .field("rate_limited", &self.rpm_limiter.is_some())
            .finish()
    }
}

impl SemanticDispatcher {
    /// Create a dispatcher running every kind of analysis without a request quota.
    pub fn new(analyzer: Arc<dyn SemanticAnalyzer>) -> Self {
        Self {
            analyzer,
            kinds: AnalysisKind::iter().collect(),
            rpm_limiter: None,
        }
    }

    /// Run only these kinds of analysis.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = AnalysisKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Kinds of analysis this dispatcher requests.
    pub fn kinds(&self) -> &BTreeSet<AnalysisKind> {
        &self.kinds
    }

    /// Limit calls to `rpm` per minute. Zero means unlimited.
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.rpm_limiter = NonZeroU32::new(rpm)
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));
        self
    }

    /// Requests for every enabled kind of analysis, in timeline order.
    ///
    /// Within a scene the narrative request comes first, then one dialogue
    /// request per line, then one emotion request per character. Each request
    /// carries up to [`PRECEDING_CONTEXT`] earlier entries of the same kind
    /// (and, for dialogue and emotion, the same character), oldest first.
    pub fn requests(&self, snapshot: &ProjectSnapshot) -> Vec<AnalysisRequest> {
        let mut scenes: Vec<PrecedingScene> = Vec::new();
        let mut lines: HashMap<EntityId, Vec<PrecedingScene>> = HashMap::new();
        let mut emotions: HashMap<EntityId, Vec<PrecedingScene>> = HashMap::new();
        let mut requests = Vec::new();

        for scene in snapshot.store().all_ordered() {
            let description = scene
                .description()
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty());

            if let Some(text) = description {
                if self.kinds.contains(&AnalysisKind::Narrative) {
                    requests.push(
                        AnalysisRequest::new(scene.id().clone(), text)
                            .with_preceding(recent(&scenes)),
                    );
                }
                scenes.push(PrecedingScene::new(scene.id().clone(), text));
            }

            if self.kinds.contains(&AnalysisKind::Dialogue) {
                for (speaker, line) in dialogue_lines(scene) {
                    let history = lines.entry(speaker.clone()).or_default();
                    requests.push(
                        AnalysisRequest::dialogue(scene.id().clone(), speaker, line.clone())
                            .with_preceding(recent(history)),
                    );
                    history.push(PrecedingScene::new(scene.id().clone(), line));
                }
            }

            if self.kinds.contains(&AnalysisKind::Emotion) {
                for (character, emotion) in emotional_states(scene) {
                    let history = emotions.entry(character.clone()).or_default();
                    requests.push(
                        AnalysisRequest::emotion(scene.id().clone(), character, emotion.clone())
                            .with_preceding(recent(history)),
                    );
                    let context = description.unwrap_or("N/A");
                    history.push(PrecedingScene::new(
                        scene.id().clone(),
                        format!("{} - Context: {}", emotion, context),
                    ));
                }
            }
        }
        requests
    }

    /// Run every request and collect findings in request order.
    ///
    /// Returns nothing when semantic analysis is disabled in `options`.
    #[instrument(skip_all, fields(analyzer = self.analyzer.name(), project = %snapshot.project_id()))]
    pub async fn run(&self, snapshot: &ProjectSnapshot, options: &ValidationOptions) -> Vec<Finding> {
        if !options.semantic_analysis_enabled() {
            debug!("Semantic analysis disabled");
            return Vec::new();
        }

        let requests = self.requests(snapshot);
        let started = Instant::now();
        let deadline = options.deadline().map(|budget| started + budget);
        let semaphore = Semaphore::new((*options.max_concurrent_semantic_calls()).max(1));
        let timeout = options.semantic_timeout();

        let calls = requests.iter().map(|request| {
            let semaphore = &semaphore;
            async move {
                let call = self.call(request, semaphore, timeout);
                let outcome = match deadline {
                    Some(deadline) => tokio::time::timeout_at(deadline, call)
                        .await
                        .unwrap_or_else(|_| {
                            Err(AnalyzerError::new(AnalyzerErrorKind::DeadlineExceeded))
                        }),
                    None => call.await,
                };
                (request, outcome)
            }
        });

        let mut findings = Vec::new();
        let mut failed = 0usize;
        for (request, outcome) in join_all(calls).await {
            match outcome {
                Ok(produced) => findings.extend(produced),
                Err(e) => {
                    warn!(
                        scene = %request.scene_id(),
                        kind = %request.kind(),
                        error = %e.kind(),
                        "Semantic analysis unavailable"
                    );
                    failed += 1;
                    findings.push(unavailable(request.scene_id(), &e));
                }
            }
        }

        info!(
            requests = requests.len(),
            failed,
            findings = findings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Semantic analysis finished"
        );
        findings
    }

    async fn call(
        &self,
        request: &AnalysisRequest,
        semaphore: &Semaphore,
        timeout: std::time::Duration,
    ) -> AnalyzerResult<Vec<Finding>> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }
        // Concurrency slot last, after the quota wait
        let _permit = semaphore.acquire().await.map_err(|e| {
            AnalyzerError::new(AnalyzerErrorKind::Unavailable(e.to_string()))
        })?;
        debug!(scene = %request.scene_id(), kind = %request.kind(), "Calling semantic analyzer");
        tokio::time::timeout(timeout, self.analyzer.analyze(request))
            .await
            .unwrap_or_else(|_| {
                Err(AnalyzerError::new(AnalyzerErrorKind::Timeout(
                    timeout.as_millis() as u64,
                )))
            })
    }
}

/// Warning finding standing in for a scene whose analysis failed.
pub fn unavailable(scene_id: &SceneId, error: &AnalyzerError) -> Finding {
    Finding::new(
        SEMANTIC_UNAVAILABLE_RULE,
        Severity::Warning,
        format!(
            "Semantic analysis unavailable for scene '{}': {}",
            scene_id,
            error.kind()
        ),
    )
    .with_scenes([scene_id.clone()])
    .with_fix("Re-run validation once the semantic analyzer is reachable")
}

fn recent(history: &[PrecedingScene]) -> Vec<PrecedingScene> {
    history[history.len().saturating_sub(PRECEDING_CONTEXT)..].to_vec()
}

/// `(speaker, line)` pairs from the scene's dialogue metadata. Entries
/// without a speaker or a non-empty line are skipped.
fn dialogue_lines(scene: &Scene) -> Vec<(EntityId, String)> {
    let Some(JsonValue::Array(entries)) = scene.metadata().get(DIALOGUE_METADATA) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let speaker = entry
                .get("entity")
                .or_else(|| entry.get("character"))
                .and_then(JsonValue::as_str)?;
            let line = entry.get("line").and_then(JsonValue::as_str)?.trim();
            (!line.is_empty()).then(|| (EntityId::from(speaker), line.to_string()))
        })
        .collect()
}

/// Characters whose snapshot in this scene sets an emotion explicitly.
fn emotional_states(scene: &Scene) -> Vec<(EntityId, String)> {
    scene
        .entity_refs()
        .iter()
        .filter_map(|(entity, snapshot)| {
            let emotion = snapshot.get(EMOTION_ATTRIBUTE)?.as_ref()?.as_str()?.trim();
            (!emotion.is_empty()).then(|| (entity.clone(), emotion.to_string()))
        })
        .collect()
}
