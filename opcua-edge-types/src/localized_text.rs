// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `LocalizedText`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A human readable text with an optional locale identifier.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    /// The locale, e.g. `en-US`. May be empty.
    pub locale: String,
    /// The text in the locale.
    pub text: String,
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText {
            locale: String::new(),
            text: value.to_string(),
        }
    }
}

impl LocalizedText {
    /// Creates a localized text from a locale and a text.
    pub fn new(locale: &str, text: &str) -> LocalizedText {
        LocalizedText {
            locale: locale.to_string(),
            text: text.to_string(),
        }
    }

    /// True if both locale and text are empty.
    pub fn is_empty(&self) -> bool {
        self.locale.is_empty() && self.text.is_empty()
    }
}
