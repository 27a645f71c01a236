// src/config/validation.rs

use super::ConfigBuilder;
use crate::constants::MAX_JOBS;
use crate::errors::ConfigError;

/// Validates combinations of options that clap cannot easily express, or that
/// arrive through the builder without going through clap at all.
pub(super) fn validate_builder_options(builder: &ConfigBuilder) -> Result<(), ConfigError> {
    if builder.tarball.unwrap_or(false) && builder.files.is_some() {
        return Err(ConfigError::Conflict {
            option1: "--tarball".to_string(),
            option2: "--files".to_string(),
        });
    }
    if let Some(files) = &builder.files {
        if files.iter().all(|f| f.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                option: "--files".to_string(),
                reason: "at least one file path is required".to_string(),
            });
        }
    }
    if let Some(jobs) = builder.jobs {
        if jobs == 0 || jobs > MAX_JOBS {
            return Err(ConfigError::InvalidValue {
                option: "--jobs".to_string(),
                reason: format!("must be between 1 and {}", MAX_JOBS),
            });
        }
    }
    if builder.timeout_secs == Some(0) {
        return Err(ConfigError::InvalidValue {
            option: "--timeout".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tarball_and_files_conflict() {
        let builder = ConfigBuilder::new()
            .repo_url("a/b")
            .tarball(true)
            .files(vec!["x".to_string()]);
        let err = validate_builder_options(&builder).unwrap_err();
        assert!(err.to_string().contains("simultaneously"));
    }

    #[test]
    fn test_jobs_bounds() {
        assert!(validate_builder_options(&ConfigBuilder::new().jobs(0)).is_err());
        assert!(validate_builder_options(&ConfigBuilder::new().jobs(MAX_JOBS + 1)).is_err());
        assert!(validate_builder_options(&ConfigBuilder::new().jobs(4)).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = validate_builder_options(&ConfigBuilder::new().timeout_secs(0)).unwrap_err();
        assert!(err.to_string().contains("--timeout"));
    }

    #[test]
    fn test_empty_file_list_rejected() {
        let builder = ConfigBuilder::new().files(vec![" ".to_string()]);
        assert!(validate_builder_options(&builder).is_err());
    }
}
