//! Dynamically typed values read and written by a [`Scheme`](super::Scheme).

use crate::error::{ArchitectError, Result};

/// A value shaped like some [`Scheme`](super::Scheme).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferValue {
    Bool(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    String(String),
    /// Items of a `List` or `FixedList`.
    List(Vec<BufferValue>),
    /// Named fields of an `Object`, in scheme order.
    Object(Vec<(String, BufferValue)>),
    /// Entries of a `Record`.
    Record(Vec<(String, BufferValue)>),
    /// A `Keyed` union: the selected key and its payload.
    Keyed(String, Box<BufferValue>),
}

impl BufferValue {
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, BufferValue)>) -> Self {
        BufferValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn keyed(key: impl Into<String>, value: BufferValue) -> Self {
        BufferValue::Keyed(key.into(), Box::new(value))
    }

    pub fn int_list(values: impl IntoIterator<Item = i32>) -> Self {
        BufferValue::List(values.into_iter().map(BufferValue::Int).collect())
    }

    fn type_name(&self) -> &'static str {
        match self {
            BufferValue::Bool(_) => "bool",
            BufferValue::Byte(_) => "byte",
            BufferValue::Short(_) => "short",
            BufferValue::Int(_) => "int",
            BufferValue::String(_) => "string",
            BufferValue::List(_) => "list",
            BufferValue::Object(_) => "object",
            BufferValue::Record(_) => "record",
            BufferValue::Keyed(_, _) => "keyed",
        }
    }

    fn mismatch(&self, expected: &str) -> ArchitectError {
        ArchitectError::SchemeMismatch(format!(
            "expected {}, found {}",
            expected,
            self.type_name()
        ))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            BufferValue::Bool(v) => Ok(*v),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_byte(&self) -> Result<u8> {
        match self {
            BufferValue::Byte(v) => Ok(*v),
            other => Err(other.mismatch("byte")),
        }
    }

    pub fn as_short(&self) -> Result<i16> {
        match self {
            BufferValue::Short(v) => Ok(*v),
            other => Err(other.mismatch("short")),
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        match self {
            BufferValue::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            BufferValue::String(v) => Ok(v),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_list(&self) -> Result<&[BufferValue]> {
        match self {
            BufferValue::List(v) => Ok(v),
            other => Err(other.mismatch("list")),
        }
    }

    /// A named field of an object.
    pub fn field(&self, name: &str) -> Result<&BufferValue> {
        match self {
            BufferValue::Object(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value)
                .ok_or_else(|| ArchitectError::SchemeMismatch(format!("missing field '{}'", name))),
            other => Err(other.mismatch("object")),
        }
    }

    pub fn as_record(&self) -> Result<&[(String, BufferValue)]> {
        match self {
            BufferValue::Record(entries) => Ok(entries),
            other => Err(other.mismatch("record")),
        }
    }

    pub fn as_keyed(&self) -> Result<(&str, &BufferValue)> {
        match self {
            BufferValue::Keyed(key, value) => Ok((key, value)),
            other => Err(other.mismatch("keyed")),
        }
    }

    /// Integers of a list of ints.
    pub fn to_ints(&self) -> Result<Vec<i32>> {
        self.as_list()?.iter().map(BufferValue::as_int).collect()
    }
}

impl From<bool> for BufferValue {
    fn from(value: bool) -> Self {
        BufferValue::Bool(value)
    }
}

impl From<u8> for BufferValue {
    fn from(value: u8) -> Self {
        BufferValue::Byte(value)
    }
}

impl From<i16> for BufferValue {
    fn from(value: i16) -> Self {
        BufferValue::Short(value)
    }
}

impl From<i32> for BufferValue {
    fn from(value: i32) -> Self {
        BufferValue::Int(value)
    }
}

impl From<String> for BufferValue {
    fn from(value: String) -> Self {
        BufferValue::String(value)
    }
}

impl From<&str> for BufferValue {
    fn from(value: &str) -> Self {
        BufferValue::String(value.to_string())
    }
}

impl<T: Into<BufferValue>> From<Vec<T>> for BufferValue {
    fn from(value: Vec<T>) -> Self {
        BufferValue::List(value.into_iter().map(Into::into).collect())
    }
}
