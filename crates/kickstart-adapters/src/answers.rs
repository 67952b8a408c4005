//! Answers-file loading.
//!
//! An answers file is a dotenv-style list of `NAME=value` lines. It
//! overrides the project config for a single invocation.

use std::path::Path;

use kickstart_core::{
    application::ApplicationError, domain::AnswersOverride, error::KickstartResult,
};
use tracing::{debug, instrument};

/// Parse an answers file. Later lines win over earlier ones.
#[instrument(fields(path = %path.display()))]
pub fn load_answers(path: &Path) -> KickstartResult<AnswersOverride> {
    let invalid = |reason: String| ApplicationError::AnswersFile {
        path: path.to_path_buf(),
        reason,
    };

    let iter = dotenvy::from_path_iter(path).map_err(|e| invalid(e.to_string()))?;
    let pairs = iter
        .collect::<Result<Vec<(String, String)>, _>>()
        .map_err(|e| invalid(e.to_string()))?;

    debug!(answers = pairs.len(), "Answers file loaded");
    Ok(AnswersOverride::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_core::error::KickstartError;
    use tempfile::TempDir;

    #[test]
    fn parses_names_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answers.env");
        std::fs::write(
            &path,
            "# chosen by the wizard\nci_provider=github\nPROJECT_NAME=\"My App\"\n",
        )
        .unwrap();

        let answers = load_answers(&path).unwrap();
        assert_eq!(answers.get("CI_PROVIDER"), Some("github"));
        assert_eq!(answers.get("PROJECT_NAME"), Some("My App"));
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn missing_file_is_an_answers_error() {
        let dir = TempDir::new().unwrap();
        let err = load_answers(&dir.path().join("nope.env")).unwrap_err();
        assert!(matches!(
            err,
            KickstartError::Application(ApplicationError::AnswersFile { .. })
        ));
    }

    #[test]
    fn malformed_line_is_an_answers_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answers.env");
        std::fs::write(&path, "GOOD=1\nthis line has no equals sign\n").unwrap();
        assert!(load_answers(&path).is_err());
    }
}
