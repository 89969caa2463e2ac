use std::collections::BTreeMap;

use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::error::ApiError;

pub const USERNAME_MIN: usize = 2;
pub const PASSWORD_MIN: usize = 8;

/// Collects per-field messages; any message turns the request into a 422.
///
/// Each field reports only the first rule it breaks.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns whether `value` is present.
    pub fn required(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() {
            self.add(field, "this field is required");
            return false;
        }
        true
    }

    /// Minimum length in characters, maximum in UTF-8 bytes
    pub fn length(&mut self, field: &str, value: &str, min: usize, max_bytes: Option<usize>) {
        if value.chars().count() < min {
            self.add(field, format!("{} must be greater than {}", field, min));
            return;
        }
        if let Some(max) = max_bytes.filter(|&max| value.len() > max) {
            self.add(field, format!("{} must be less than {}", field, max));
        }
    }

    pub fn username(&mut self, value: &str) {
        if self.required("username", value) {
            self.length("username", value, USERNAME_MIN, None);
        }
    }

    pub fn password(&mut self, value: &str) {
        if self.required("password", value) {
            self.length("password", value, PASSWORD_MIN, Some(MAX_PASSWORD_BYTES));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.fields))
        }
    }
}
