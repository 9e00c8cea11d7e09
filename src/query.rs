use crate::errors::ValidationError;

pub const MAX_QUERY_CHARS: usize = 100;

/// A search term that passed length validation, kept exactly as given.
/// Matching trims it later; blank terms are still valid searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let len = raw.chars().count();
        if len == 0 {
            return Err(ValidationError::Empty);
        }
        if len > MAX_QUERY_CHARS {
            return Err(ValidationError::TooLong {
                max: MAX_QUERY_CHARS,
                len,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
