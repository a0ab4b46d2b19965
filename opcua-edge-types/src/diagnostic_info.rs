// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `EdgeDiagnosticInfo`.

/// Vendor specific diagnostic information attached to a response.
///
/// The numeric fields are indexes into the string table returned with the
/// service response; the adapter carries them through without resolving.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeDiagnosticInfo {
    /// Index of the symbolic id in the server's string table.
    pub symbolic_id: i32,
    /// Index of the localized error text.
    pub localized_text: i32,
    /// Index of the locale of the error text.
    pub locale: i32,
    /// Vendor specific detail text.
    pub additional_info: Option<String>,
    /// Diagnostics of an inner result.
    pub inner: Option<Box<EdgeDiagnosticInfo>>,
    /// Set by the adapter when the diagnostics returned by the service did
    /// not line up with the request.
    pub message: Option<String>,
}

impl EdgeDiagnosticInfo {
    /// Diagnostic info carrying only an adapter-side message.
    pub fn from_message(message: &str) -> EdgeDiagnosticInfo {
        EdgeDiagnosticInfo {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }
}
