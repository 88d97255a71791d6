//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the scenecheck binary.

mod commands;
mod rules;
mod validate;
mod watch;

pub use commands::{Cli, Commands, ValidateArgs, WatchArgs};
pub use rules::list_rules;
pub use validate::run_validation;
pub use watch::run_watch;

use scenecheck::{SceneCheckError, is_retryable};
use std::error::Error;

/// Exit status for failures that may succeed if the command is run again.
pub const EXIT_TEMPFAIL: u8 = 75;

/// Exit status for a command error, when it differs from the generic failure.
pub fn retry_exit_code(err: &(dyn Error + 'static)) -> Option<u8> {
    err.downcast_ref::<SceneCheckError>()
        .filter(|err| is_retryable(err.kind()))
        .map(|_| EXIT_TEMPFAIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecheck::{
        AnalyzerError, AnalyzerErrorKind, ConfigError, ConfigErrorKind, ProjectError,
        ProjectErrorKind,
    };

    fn boxed(err: impl Into<SceneCheckError>) -> Box<dyn Error> {
        let err: SceneCheckError = err.into();
        Box::new(err)
    }

    #[test]
    fn test_locked_project_exits_with_tempfail() {
        let err = boxed(ProjectError::new(ProjectErrorKind::ProjectLocked(
            "pilot".to_string(),
        )));
        assert_eq!(retry_exit_code(err.as_ref()), Some(EXIT_TEMPFAIL));
    }

    #[test]
    fn test_overloaded_analyzer_exits_with_tempfail() {
        let err = boxed(AnalyzerError::new(AnalyzerErrorKind::Http {
            status_code: 503,
            message: "overloaded".to_string(),
        }));
        assert_eq!(retry_exit_code(err.as_ref()), Some(EXIT_TEMPFAIL));
    }

    #[test]
    fn test_permanent_errors_use_generic_failure() {
        let err = boxed(ConfigError::new(ConfigErrorKind::MissingFile(
            "rules.toml".to_string(),
        )));
        assert_eq!(retry_exit_code(err.as_ref()), None);

        let io: Box<dyn Error> = Box::new(std::io::Error::other("disk full"));
        assert_eq!(retry_exit_code(io.as_ref()), None);
    }
}
