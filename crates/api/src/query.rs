//! Shared query parameter types for API handlers.

use challenge_core::error::CoreError;
use challenge_db::models::status::{PromptStatus, StatusId};
use serde::Deserialize;

/// `?status=` filter for prompt listings (`scheduled`, `active`, ...).
#[derive(Debug, Deserialize)]
pub struct PromptStatusParams {
    pub status: Option<String>,
}

impl PromptStatusParams {
    /// Resolve the filter to a status ID. Unknown names are a validation error.
    pub fn status_id(&self) -> Result<Option<StatusId>, CoreError> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(name) => PromptStatus::from_name(name)
                .map(|s| Some(s.id()))
                .ok_or_else(|| CoreError::Validation(format!("Unknown prompt status '{name}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(status: Option<&str>) -> PromptStatusParams {
        PromptStatusParams {
            status: status.map(String::from),
        }
    }

    #[test]
    fn missing_or_empty_status_means_no_filter() {
        assert_eq!(params(None).status_id().unwrap(), None);
        assert_eq!(params(Some("")).status_id().unwrap(), None);
    }

    #[test]
    fn known_status_resolves_to_id() {
        assert_eq!(
            params(Some("voting")).status_id().unwrap(),
            Some(PromptStatus::Voting.id())
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(params(Some("archived")).status_id().is_err());
    }
}
