//! Project state for the SceneCheck continuity validator.
//!
//! A [`Project`] owns three pieces of state:
//!
//! - [`EntityRegistry`]: the explicit entity vocabulary
//! - [`SceneStore`]: scenes in timeline order
//! - [`ContinuityTracker`]: per-entity attribute timelines derived from the store
//!
//! Mutations go through a [`ProjectHandle`] (one writer at a time), and
//! validation runs against an immutable [`ProjectSnapshot`] whose `version` is
//! a content hash.
//!
//! # Example
//!
//! ```rust
//! use scenecheck_core::{Entity, EntityId, EntityKind, Scene, SceneId};
//! use scenecheck_project::Project;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut project = Project::new("pilot");
//! project.register(Entity::new("rex", EntityKind::Character))?;
//! project.insert_scene(Scene::new("s1", 1).with_attributes("rex", [("jacket", json!("red"))]))?;
//! project.insert_scene(Scene::new("s2", 2))?;
//!
//! let state = project.tracker().state_at(
//!     project.store(),
//!     &EntityId::from("rex"),
//!     &SceneId::from("s2"),
//! )?;
//! assert_eq!(state["jacket"], json!("red"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod handle;
mod loader;
mod project;
mod registry;
mod snapshot;
mod store;
mod tracker;
mod workspace;

pub use handle::ProjectHandle;
pub use loader::{load_project, load_project_file};
pub use project::{LoadIssue, Project};
pub use registry::EntityRegistry;
pub use snapshot::ProjectSnapshot;
pub use store::{SceneEdit, SceneStore, TiePolicy};
pub use tracker::{ContinuityTracker, EntityTimeline, TimelineEntry, Transition};
pub use workspace::Workspace;
