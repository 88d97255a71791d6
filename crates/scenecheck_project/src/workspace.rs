//! Per-project lifecycle.

use crate::{Project, ProjectHandle, TiePolicy, load_project};
use scenecheck_error::{ProjectError, ProjectErrorKind, SceneCheckResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Open projects, keyed by id.
///
/// Each project carries its own entity vocabulary, so projects validated side
/// by side never see each other's state.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    projects: Arc<RwLock<BTreeMap<String, ProjectHandle>>>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a project document and open it under `id`.
    #[instrument(skip(self, document))]
    pub async fn open(
        &self,
        id: &str,
        document: &str,
        tie_policy: TiePolicy,
    ) -> SceneCheckResult<ProjectHandle> {
        let project = load_project(id, document, tie_policy)?;
        self.insert(project).await
    }

    /// Open an already-built project.
    pub async fn insert(&self, project: Project) -> SceneCheckResult<ProjectHandle> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(project.id()) {
            return Err(ProjectError::new(ProjectErrorKind::DuplicateProject(
                project.id().to_string(),
            ))
            .into());
        }
        let handle = ProjectHandle::new(project);
        projects.insert(handle.id().to_string(), handle.clone());
        info!(project = handle.id(), "Opened project");
        Ok(handle)
    }

    /// Handle to an open project.
    pub async fn get(&self, id: &str) -> SceneCheckResult<ProjectHandle> {
        self.projects
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ProjectError::new(ProjectErrorKind::UnknownProject(id.to_string())).into())
    }

    /// Close a project. Outstanding handles stay usable until dropped.
    #[instrument(skip(self))]
    pub async fn close(&self, id: &str) -> SceneCheckResult<()> {
        self.projects
            .write()
            .await
            .remove(id)
            .ok_or_else(|| ProjectError::new(ProjectErrorKind::UnknownProject(id.to_string())))?;
        info!(project = id, "Closed project");
        Ok(())
    }

    /// Ids of open projects.
    pub async fn ids(&self) -> Vec<String> {
        self.projects.read().await.keys().cloned().collect()
    }
}
