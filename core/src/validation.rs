//! Form validation contract.
//!
//! A draft is accepted when both `title` and `body` contain something other
//! than whitespace. The text itself is passed on exactly as typed.

use std::fmt;

use thiserror::Error;

use crate::error::ErrorKind;
use crate::types::PostDraft;

/// A required draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Body,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::Title => f.write_str("title"),
            DraftField::Body => f.write_str("body"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing required fields: {}", join(.missing))]
pub struct ValidationError {
    pub missing: Vec<DraftField>,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

fn join(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A draft that passed validation. Only constructible through `validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft(PostDraft);

impl ValidDraft {
    pub fn as_draft(&self) -> &PostDraft {
        &self.0
    }

    pub fn into_draft(self) -> PostDraft {
        self.0
    }
}

impl TryFrom<PostDraft> for ValidDraft {
    type Error = ValidationError;

    fn try_from(draft: PostDraft) -> Result<Self, Self::Error> {
        validate(&draft)?;
        Ok(ValidDraft(draft))
    }
}

/// Check a draft without consuming it.
pub fn validate(draft: &PostDraft) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if draft.title.trim().is_empty() {
        missing.push(DraftField::Title);
    }
    if draft.body.trim().is_empty() {
        missing.push(DraftField::Body);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}
