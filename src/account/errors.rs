//! Error-code translation for user-facing messages.

use std::collections::HashMap;

/// Turns backend error codes into messages the user can read.
pub trait ErrorTranslator: Send + Sync {
    /// Message for `code`. Missing or unknown codes yield a generic message.
    fn message(&self, code: Option<&str>) -> String;
}

/// Message catalog keyed by backend error code.
#[derive(Debug, Clone)]
pub struct CatalogTranslator {
    messages: HashMap<String, String>,
    unknown: String,
}

impl CatalogTranslator {
    /// Empty catalog; every code maps to `unknown`.
    pub fn new(unknown: impl Into<String>) -> Self {
        Self {
            messages: HashMap::new(),
            unknown: unknown.into(),
        }
    }

    pub fn with_message(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(code.into(), message.into());
        self
    }
}

impl Default for CatalogTranslator {
    fn default() -> Self {
        Self::new("Something went wrong. Please try again later.")
            .with_message("UNAUTHORIZED", "Your session has expired. Please sign in again.")
            .with_message("FORBIDDEN", "You are not allowed to change this account.")
            .with_message("VALIDATION_ERROR", "Some of your details could not be saved.")
            .with_message("INTERNAL_SERVER_ERROR", "Our servers had a problem. Please try again later.")
    }
}

impl ErrorTranslator for CatalogTranslator {
    fn message(&self, code: Option<&str>) -> String {
        let Some(code) = code else {
            return self.unknown.clone();
        };
        match self.messages.get(code) {
            Some(msg) => msg.clone(),
            None => {
                tracing::debug!(code, "Unknown API error code");
                self.unknown.clone()
            }
        }
    }
}
