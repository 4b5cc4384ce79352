use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::shared::errors::AppError;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+(?:[\-_]+[a-zA-Z0-9]+)*$").expect("name pattern is valid")
});

const MAX_NAME_LENGTH: usize = 40;

pub struct Validator;

impl Validator {
    /// Job names and types are used as URL path segments on the job API.
    pub fn validate_job_identifier(kind: &str, value: &str) -> Result<(), AppError> {
        if value.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Job {} cannot be empty",
                kind
            )));
        }
        if value.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Job {} too long (max {} characters)",
                kind, MAX_NAME_LENGTH
            )));
        }
        if !NAME_PATTERN.is_match(value) {
            return Err(AppError::ValidationError(format!(
                "Job {} '{}' contains invalid characters",
                kind, value
            )));
        }
        Ok(())
    }

    pub fn validate_timeout(timeout: Duration) -> Result<(), AppError> {
        if timeout.is_zero() {
            return Err(AppError::ValidationError(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(Validator::validate_job_identifier("name", "tenant1-db_main").is_ok());
        assert!(Validator::validate_job_identifier("type", "database-postgres").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(Validator::validate_job_identifier("name", "").is_err());
        assert!(Validator::validate_job_identifier("name", "-leading").is_err());
        assert!(Validator::validate_job_identifier("name", "has space").is_err());
        assert!(Validator::validate_job_identifier("name", &"a".repeat(41)).is_err());
    }

    #[test]
    fn test_timeout() {
        assert!(Validator::validate_timeout(Duration::ZERO).is_err());
        assert!(Validator::validate_timeout(Duration::from_secs(1)).is_ok());
    }
}
