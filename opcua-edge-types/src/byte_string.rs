// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `ByteString`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A sequence of octets. A null byte string is distinct from an empty one.
#[derive(Eq, PartialEq, Clone, Hash, Default, Serialize, Deserialize)]
pub struct ByteString {
    /// The raw octets, `None` for a null byte string.
    pub value: Option<Vec<u8>>,
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "ByteString({} bytes)", value.len()),
            None => write!(f, "ByteString(null)"),
        }
    }
}

impl From<&[u8]> for ByteString {
    fn from(value: &[u8]) -> Self {
        ByteString {
            value: Some(value.to_vec()),
        }
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        ByteString { value: Some(value) }
    }
}

impl ByteString {
    /// Creates a null byte string.
    pub fn null() -> ByteString {
        ByteString { value: None }
    }

    /// True if the byte string is null.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// True if the byte string is null or has zero length.
    pub fn is_null_or_empty(&self) -> bool {
        self.value.as_ref().map_or(true, |v| v.is_empty())
    }

    /// The octets, or an empty slice for a null byte string.
    pub fn as_ref(&self) -> &[u8] {
        self.value.as_deref().unwrap_or_default()
    }

    /// Length in octets, 0 for a null byte string.
    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    /// True if the byte string holds no octets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
