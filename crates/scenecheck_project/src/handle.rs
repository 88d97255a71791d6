//! Single-writer, multiple-reader access to a project.

use crate::{Project, ProjectSnapshot};
use scenecheck_error::{ProjectError, ProjectErrorKind, SceneCheckResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Shared handle to one project.
///
/// Mutations are serialized through a write lock. Validations read an
/// immutable [`ProjectSnapshot`] and never hold the lock while they run.
#[derive(Debug, Clone)]
pub struct ProjectHandle {
    id: String,
    inner: Arc<RwLock<Project>>,
}

impl ProjectHandle {
    /// Wrap a project.
    pub fn new(project: Project) -> Self {
        Self {
            id: project.id().to_string(),
            inner: Arc::new(RwLock::new(project)),
        }
    }

    /// Project id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Apply a mutation, waiting for other writers and readers to finish.
    #[instrument(skip(self, f), fields(project = %self.id))]
    pub async fn mutate<F, T>(&self, f: F) -> SceneCheckResult<T>
    where
        F: FnOnce(&mut Project) -> SceneCheckResult<T>,
    {
        let mut project = self.inner.write().await;
        debug!("Acquired project write lock");
        f(&mut project)
    }

    /// Apply a mutation only if the project is free right now.
    ///
    /// # Errors
    ///
    /// `ProjectLocked` if another writer or reader holds the lock. The caller
    /// may retry.
    pub fn try_mutate<F, T>(&self, f: F) -> SceneCheckResult<T>
    where
        F: FnOnce(&mut Project) -> SceneCheckResult<T>,
    {
        let mut project = self.inner.try_write().map_err(|_| {
            warn!(project = %self.id, "Rejected concurrent writer");
            ProjectError::new(ProjectErrorKind::ProjectLocked(self.id.clone()))
        })?;
        f(&mut project)
    }

    /// Run a read-only closure against the live project.
    pub async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Project) -> T,
    {
        let project = self.inner.read().await;
        f(&project)
    }

    /// Capture an immutable snapshot for validation.
    pub async fn snapshot(&self) -> SceneCheckResult<Arc<ProjectSnapshot>> {
        let project = self.inner.read().await;
        Ok(Arc::new(project.snapshot()?))
    }
}
