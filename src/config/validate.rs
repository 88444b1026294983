// src/config/validate.rs

use crate::config::model::{ConfigFile, ExecuteOptions, RawConfigFile};
use crate::errors::{Result, TaskDagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskDagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_execute_options(&raw.execute)?;
        Ok(ConfigFile::new_unchecked(raw.execute, raw.logging))
    }
}

/// Semantic checks on execution options.
pub fn validate_execute_options(opts: &ExecuteOptions) -> Result<()> {
    if opts.worker_count == 0 {
        return Err(TaskDagError::ConfigError(
            "[execute].worker_count must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;
    use crate::logging::LogLevel;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ConfigFile::try_from(load_from_str("").unwrap()).unwrap();
        assert_eq!(cfg.execute, ExecuteOptions::default());
        assert_eq!(cfg.execute.worker_count, 5);
        assert!(cfg.logging.level.is_none());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let raw = load_from_str("[execute]\nworker_count = 0\n").unwrap();
        match ConfigFile::try_from(raw) {
            Err(TaskDagError::ConfigError(msg)) => assert!(msg.contains("worker_count")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn sections_are_read() {
        let raw = load_from_str(
            r#"
[execute]
worker_count = 2
debug_log = true

[logging]
level = "debug"
"#,
        )
        .unwrap();
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert_eq!(cfg.execute.worker_count, 2);
        assert!(cfg.execute.debug_log);
        assert_eq!(cfg.logging.level, Some(LogLevel::Debug));
    }
}
