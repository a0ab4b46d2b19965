// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `EdgeNodeId` and `EdgeNodeInfo`.

use std::fmt;

use crate::{ByteString, Guid};

/// The kind of identifier inside a node id.
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub enum Identifier {
    /// A numeric identity for the node.
    Numeric(u32),
    /// A string identity for the node.
    String(String),
    /// A guid identity for the node.
    Guid(Guid),
    /// An opaque identity for the node.
    ByteString(ByteString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={v}"),
            Identifier::String(v) => write!(f, "s={v}"),
            Identifier::Guid(v) => write!(f, "g={v}"),
            Identifier::ByteString(v) => write!(f, "b={} bytes", v.len()),
        }
    }
}

/// An identifier for a node in the address space of an OPC UA server.
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub struct EdgeNodeId {
    /// The index of the namespace the node lives in.
    pub namespace: u16,
    /// The identifier of the node within the namespace.
    pub identifier: Identifier,
}

impl fmt::Display for EdgeNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};{}", self.namespace, self.identifier)
        } else {
            write!(f, "{}", self.identifier)
        }
    }
}

impl EdgeNodeId {
    /// A node id with a numeric identifier.
    pub fn numeric(namespace: u16, value: u32) -> EdgeNodeId {
        EdgeNodeId {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// A node id with a string identifier.
    pub fn string(namespace: u16, value: &str) -> EdgeNodeId {
        EdgeNodeId {
            namespace,
            identifier: Identifier::String(value.to_string()),
        }
    }

    /// A node id with a guid identifier.
    pub fn guid(namespace: u16, value: Guid) -> EdgeNodeId {
        EdgeNodeId {
            namespace,
            identifier: Identifier::Guid(value),
        }
    }
}

/// A reference to a remote node as carried inside requests and responses.
/// The `value_alias` is the string form of the node id used on the wire for
/// batched operations; it is required for every command except Browse.
#[derive(Eq, PartialEq, Clone, Debug, Default)]
pub struct EdgeNodeInfo {
    /// The full node id, when the caller knows it. Responses built by the
    /// adapter may carry only the alias.
    pub node_id: Option<EdgeNodeId>,
    /// String form node identity used on the wire.
    pub value_alias: String,
    /// Browse name of the method to call, for Method requests.
    pub method_name: Option<String>,
}

impl EdgeNodeInfo {
    /// A node info from a namespace index and a wire alias.
    pub fn new(namespace: u16, value_alias: &str) -> EdgeNodeInfo {
        EdgeNodeInfo {
            node_id: Some(EdgeNodeId::string(namespace, value_alias)),
            value_alias: value_alias.to_string(),
            method_name: None,
        }
    }

    /// The namespace index of the node, 0 if no node id is present.
    pub fn namespace(&self) -> u16 {
        self.node_id.as_ref().map(|n| n.namespace).unwrap_or(0)
    }
}
