// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `EdgeVariant`, the polymorphic value
//! container carried inside requests, responses and notifications.

use std::fmt::{self, Display};

use crate::{ByteString, Guid, LocalizedText, StatusCode, UaDateTime};

/// Type tag of a scalar value. The discriminants are the OPC UA built-in
/// type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EdgeTypeId {
    /// Boolean
    Boolean = 1,
    /// Signed byte
    SByte = 2,
    /// Unsigned byte
    Byte = 3,
    /// Signed 16 bit integer
    Int16 = 4,
    /// Unsigned 16 bit integer
    UInt16 = 5,
    /// Signed 32 bit integer
    Int32 = 6,
    /// Unsigned 32 bit integer
    UInt32 = 7,
    /// Signed 64 bit integer
    Int64 = 8,
    /// Unsigned 64 bit integer
    UInt64 = 9,
    /// 32 bit floating point number
    Float = 10,
    /// 64 bit floating point number
    Double = 11,
    /// String
    String = 12,
    /// Timestamp
    DateTime = 13,
    /// Globally unique id
    Guid = 14,
    /// Byte string
    ByteString = 15,
    /// Status code
    StatusCode = 19,
    /// Localized text
    LocalizedText = 21,
}

/// Static description of a scalar type: its tag, symbolic name and the
/// in-memory size of fixed-size scalars (0 for heap-allocated kinds).
/// Decode and encode paths share this table instead of switching over
/// runtime type ids.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// The type tag.
    pub id: EdgeTypeId,
    /// Symbolic name, e.g. `"Int32"`.
    pub name: &'static str,
    /// Size of one scalar in bytes, 0 for variable-size types.
    pub scalar_size: usize,
}

static TYPE_TABLE: &[TypeInfo] = &[
    TypeInfo { id: EdgeTypeId::Boolean, name: "Boolean", scalar_size: 1 },
    TypeInfo { id: EdgeTypeId::SByte, name: "SByte", scalar_size: 1 },
    TypeInfo { id: EdgeTypeId::Byte, name: "Byte", scalar_size: 1 },
    TypeInfo { id: EdgeTypeId::Int16, name: "Int16", scalar_size: 2 },
    TypeInfo { id: EdgeTypeId::UInt16, name: "UInt16", scalar_size: 2 },
    TypeInfo { id: EdgeTypeId::Int32, name: "Int32", scalar_size: 4 },
    TypeInfo { id: EdgeTypeId::UInt32, name: "UInt32", scalar_size: 4 },
    TypeInfo { id: EdgeTypeId::Int64, name: "Int64", scalar_size: 8 },
    TypeInfo { id: EdgeTypeId::UInt64, name: "UInt64", scalar_size: 8 },
    TypeInfo { id: EdgeTypeId::Float, name: "Float", scalar_size: 4 },
    TypeInfo { id: EdgeTypeId::Double, name: "Double", scalar_size: 8 },
    TypeInfo { id: EdgeTypeId::String, name: "String", scalar_size: 0 },
    TypeInfo { id: EdgeTypeId::DateTime, name: "DateTime", scalar_size: 8 },
    TypeInfo { id: EdgeTypeId::Guid, name: "Guid", scalar_size: 16 },
    TypeInfo { id: EdgeTypeId::ByteString, name: "ByteString", scalar_size: 0 },
    TypeInfo { id: EdgeTypeId::StatusCode, name: "StatusCode", scalar_size: 4 },
    TypeInfo { id: EdgeTypeId::LocalizedText, name: "LocalizedText", scalar_size: 0 },
];

impl EdgeTypeId {
    /// Looks up the static description of this type.
    pub fn info(self) -> &'static TypeInfo {
        TYPE_TABLE
            .iter()
            .find(|t| t.id == self)
            .expect("every type id has a table entry")
    }

    /// Symbolic name of the type.
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl Display for EdgeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single dimension array of scalars, all of the same type.
#[derive(PartialEq, Debug, Clone)]
pub struct EdgeArray {
    /// Type of every element in the array.
    pub value_type: EdgeTypeId,
    /// The elements. Each must be a scalar of `value_type`.
    pub values: Vec<EdgeVariant>,
}

impl EdgeArray {
    /// Creates an array, validating that every element is a scalar of the
    /// declared type.
    pub fn new(value_type: EdgeTypeId, values: Vec<EdgeVariant>) -> Result<EdgeArray, String> {
        for v in &values {
            if v.type_id() != Some(value_type) || v.is_array() {
                return Err(format!(
                    "array of {} contains an element of a different type",
                    value_type
                ));
            }
        }
        Ok(EdgeArray { value_type, values })
    }
}

/// An `EdgeVariant` holds a scalar of one of the supported built-in types,
/// or a single dimension array of such scalars.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum EdgeVariant {
    /// An empty value.
    #[default]
    Empty,
    /// Boolean
    Boolean(bool),
    /// Signed byte
    SByte(i8),
    /// Unsigned byte
    Byte(u8),
    /// Signed 16-bit int
    Int16(i16),
    /// Unsigned 16-bit int
    UInt16(u16),
    /// Signed 32-bit int
    Int32(i32),
    /// Unsigned 32-bit int
    UInt32(u32),
    /// Signed 64-bit int
    Int64(i64),
    /// Unsigned 64-bit int
    UInt64(u64),
    /// Float
    Float(f32),
    /// Double
    Double(f64),
    /// String
    String(String),
    /// DateTime
    DateTime(UaDateTime),
    /// Guid
    Guid(Box<Guid>),
    /// ByteString
    ByteString(ByteString),
    /// StatusCode
    StatusCode(StatusCode),
    /// LocalizedText
    LocalizedText(Box<LocalizedText>),
    /// Single dimension array of scalars, all the same type.
    Array(Box<EdgeArray>),
}

impl EdgeVariant {
    /// The scalar type tag of the value. For arrays this is the element
    /// type; `None` for `Empty`.
    pub fn type_id(&self) -> Option<EdgeTypeId> {
        match self {
            EdgeVariant::Empty => None,
            EdgeVariant::Boolean(_) => Some(EdgeTypeId::Boolean),
            EdgeVariant::SByte(_) => Some(EdgeTypeId::SByte),
            EdgeVariant::Byte(_) => Some(EdgeTypeId::Byte),
            EdgeVariant::Int16(_) => Some(EdgeTypeId::Int16),
            EdgeVariant::UInt16(_) => Some(EdgeTypeId::UInt16),
            EdgeVariant::Int32(_) => Some(EdgeTypeId::Int32),
            EdgeVariant::UInt32(_) => Some(EdgeTypeId::UInt32),
            EdgeVariant::Int64(_) => Some(EdgeTypeId::Int64),
            EdgeVariant::UInt64(_) => Some(EdgeTypeId::UInt64),
            EdgeVariant::Float(_) => Some(EdgeTypeId::Float),
            EdgeVariant::Double(_) => Some(EdgeTypeId::Double),
            EdgeVariant::String(_) => Some(EdgeTypeId::String),
            EdgeVariant::DateTime(_) => Some(EdgeTypeId::DateTime),
            EdgeVariant::Guid(_) => Some(EdgeTypeId::Guid),
            EdgeVariant::ByteString(_) => Some(EdgeTypeId::ByteString),
            EdgeVariant::StatusCode(_) => Some(EdgeTypeId::StatusCode),
            EdgeVariant::LocalizedText(_) => Some(EdgeTypeId::LocalizedText),
            EdgeVariant::Array(array) => Some(array.value_type),
        }
    }

    /// True if the value is a single dimension array.
    pub fn is_array(&self) -> bool {
        matches!(self, EdgeVariant::Array(_))
    }

    /// Number of elements for arrays, 0 for scalars.
    pub fn array_length(&self) -> usize {
        match self {
            EdgeVariant::Array(array) => array.values.len(),
            _ => 0,
        }
    }

    /// True for `Empty`.
    pub fn is_empty(&self) -> bool {
        matches!(self, EdgeVariant::Empty)
    }
}

impl From<bool> for EdgeVariant {
    fn from(v: bool) -> Self {
        EdgeVariant::Boolean(v)
    }
}
impl From<i8> for EdgeVariant {
    fn from(v: i8) -> Self {
        EdgeVariant::SByte(v)
    }
}
impl From<u8> for EdgeVariant {
    fn from(v: u8) -> Self {
        EdgeVariant::Byte(v)
    }
}
impl From<i16> for EdgeVariant {
    fn from(v: i16) -> Self {
        EdgeVariant::Int16(v)
    }
}
impl From<u16> for EdgeVariant {
    fn from(v: u16) -> Self {
        EdgeVariant::UInt16(v)
    }
}
impl From<i32> for EdgeVariant {
    fn from(v: i32) -> Self {
        EdgeVariant::Int32(v)
    }
}
impl From<u32> for EdgeVariant {
    fn from(v: u32) -> Self {
        EdgeVariant::UInt32(v)
    }
}
impl From<i64> for EdgeVariant {
    fn from(v: i64) -> Self {
        EdgeVariant::Int64(v)
    }
}
impl From<u64> for EdgeVariant {
    fn from(v: u64) -> Self {
        EdgeVariant::UInt64(v)
    }
}
impl From<f32> for EdgeVariant {
    fn from(v: f32) -> Self {
        EdgeVariant::Float(v)
    }
}
impl From<f64> for EdgeVariant {
    fn from(v: f64) -> Self {
        EdgeVariant::Double(v)
    }
}
impl From<&str> for EdgeVariant {
    fn from(v: &str) -> Self {
        EdgeVariant::String(v.to_string())
    }
}
impl From<String> for EdgeVariant {
    fn from(v: String) -> Self {
        EdgeVariant::String(v)
    }
}
impl From<Guid> for EdgeVariant {
    fn from(v: Guid) -> Self {
        EdgeVariant::Guid(Box::new(v))
    }
}
impl From<ByteString> for EdgeVariant {
    fn from(v: ByteString) -> Self {
        EdgeVariant::ByteString(v)
    }
}
impl From<LocalizedText> for EdgeVariant {
    fn from(v: LocalizedText) -> Self {
        EdgeVariant::LocalizedText(Box::new(v))
    }
}
impl From<UaDateTime> for EdgeVariant {
    fn from(v: UaDateTime) -> Self {
        EdgeVariant::DateTime(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_type_ids() {
        assert_eq!(EdgeVariant::from(42i32).type_id(), Some(EdgeTypeId::Int32));
        assert_eq!(EdgeVariant::from("hi").type_id(), Some(EdgeTypeId::String));
        assert_eq!(EdgeVariant::Empty.type_id(), None);
        assert!(!EdgeVariant::from(1.5f64).is_array());
        assert_eq!(EdgeVariant::from(1.5f64).array_length(), 0);
    }

    #[test]
    fn array_reports_element_type_and_length() {
        let array = EdgeArray::new(
            EdgeTypeId::Int32,
            vec![EdgeVariant::from(1i32), EdgeVariant::from(2i32)],
        )
        .unwrap();
        let value = EdgeVariant::Array(Box::new(array));
        assert!(value.is_array());
        assert_eq!(value.array_length(), 2);
        assert_eq!(value.type_id(), Some(EdgeTypeId::Int32));
    }

    #[test]
    fn heterogeneous_array_is_rejected() {
        let result = EdgeArray::new(
            EdgeTypeId::Int32,
            vec![EdgeVariant::from(1i32), EdgeVariant::from("two")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn type_table_covers_all_tags() {
        assert_eq!(EdgeTypeId::Int32.name(), "Int32");
        assert_eq!(EdgeTypeId::Int32.info().scalar_size, 4);
        assert_eq!(EdgeTypeId::String.info().scalar_size, 0);
        assert_eq!(EdgeTypeId::Guid.info().scalar_size, 16);
    }
}
