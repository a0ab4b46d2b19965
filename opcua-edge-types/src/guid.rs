// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `Guid`.

use std::{fmt, str::FromStr};

use uuid::Uuid;

/// A Guid is a 16 byte Globally Unique Identifier. Its textual form is
/// the lowercase hyphenated `8-4-4-4-12` rendering.
#[derive(Eq, PartialEq, Clone, Hash)]
pub struct Guid {
    uuid: Uuid,
}

impl From<Guid> for Uuid {
    fn from(value: Guid) -> Self {
        value.uuid
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid.as_hyphenated())
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(|uuid| Guid { uuid })
    }
}

impl Default for Guid {
    fn default() -> Self {
        Guid::null()
    }
}

impl Guid {
    /// Creates a random Guid.
    pub fn new() -> Guid {
        Guid {
            uuid: Uuid::new_v4(),
        }
    }

    /// Returns a null (all zero) Guid.
    pub fn null() -> Guid {
        Guid { uuid: Uuid::nil() }
    }

    /// True if this is the null Guid.
    pub fn is_null(&self) -> bool {
        self.uuid.is_nil()
    }

    /// Creates a Guid from 16 bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Guid {
        Guid {
            uuid: Uuid::from_bytes(bytes),
        }
    }

    /// The raw bytes of the Guid.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.uuid.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_guid_formats_as_zeros() {
        assert_eq!(
            Guid::null().to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn guid_text_form_is_lowercase_hyphenated() {
        let guid = Guid::from_bytes([
            0x72, 0x96, 0x2B, 0x91, 0xFA, 0x75, 0x4A, 0xE6, 0x8D, 0x28, 0xB4, 0x04, 0xDC, 0x7D,
            0xAF, 0x63,
        ]);
        assert_eq!(guid.to_string(), "72962b91-fa75-4ae6-8d28-b404dc7daf63");
    }

    #[test]
    fn guid_parses_its_own_output() {
        let guid = Guid::new();
        let parsed = Guid::from_str(&guid.to_string()).unwrap();
        assert_eq!(guid, parsed);
    }
}
