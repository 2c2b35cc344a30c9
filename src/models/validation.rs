use std::collections::BTreeMap;
use std::fmt;

/// Input rejected before it reached storage.
///
/// `message` is the first problem found so callers that only show one line
/// still show something specific; `field_errors` carries all of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.push(field, message);
        error
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        if self.message.is_empty() {
            self.message = message.clone();
        }
        self.field_errors.entry(field.to_string()).or_insert(message);
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.field_errors.is_empty()
    }

    /// `Ok(value)` when nothing was pushed
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}
