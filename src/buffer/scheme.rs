//! Codec descriptors.

use super::BufferValue;
use crate::error::{ArchitectError, Result};

/// Describes how one value is laid out in a byte buffer.
///
/// All integers are big-endian. Strings carry a 2-byte length prefix (bytes of
/// UTF-8), lists and records a 4-byte count prefix. Fixed lists and objects
/// have no prefix at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Bool,
    Byte,
    Short,
    Int,
    String,
    /// Count-prefixed homogeneous list.
    List(Box<Scheme>),
    /// Homogeneous list of a length both sides agree on.
    FixedList(Box<Scheme>, usize),
    /// Fixed ordered fields, concatenated.
    Object(Vec<(String, Scheme)>),
    /// Count-prefixed `(string key, value)` pairs.
    Record(Box<Scheme>),
    /// A string tag selecting which scheme encodes the payload.
    Keyed(Vec<(String, Scheme)>),
}

impl Scheme {
    pub fn list(item: Scheme) -> Self {
        Scheme::List(Box::new(item))
    }

    pub fn fixed_list(item: Scheme, len: usize) -> Self {
        Scheme::FixedList(Box::new(item), len)
    }

    pub fn record(value: Scheme) -> Self {
        Scheme::Record(Box::new(value))
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Scheme)>) -> Self {
        Scheme::Object(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    pub fn keyed<K: Into<String>>(variants: impl IntoIterator<Item = (K, Scheme)>) -> Self {
        Scheme::Keyed(variants.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// Encoded size when it does not depend on the value.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Scheme::Bool | Scheme::Byte => Some(1),
            Scheme::Short => Some(2),
            Scheme::Int => Some(4),
            Scheme::FixedList(item, len) => item.fixed_size().map(|size| size * len),
            Scheme::Object(fields) => fields.iter().map(|(_, s)| s.fixed_size()).sum(),
            Scheme::String | Scheme::List(_) | Scheme::Record(_) | Scheme::Keyed(_) => None,
        }
    }

    fn variant(&self, key: &str) -> Result<&Scheme> {
        match self {
            Scheme::Keyed(variants) => variants
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, s)| s)
                .ok_or_else(|| ArchitectError::UnknownKey(key.to_string())),
            _ => Err(ArchitectError::SchemeMismatch(
                "variant lookup on a non-keyed scheme".to_string(),
            )),
        }
    }

    /// Bytes `value` occupies when written with this scheme.
    pub fn size_of(&self, value: &BufferValue) -> Result<usize> {
        if let Some(size) = self.fixed_size() {
            self.check_shape(value)?;
            return Ok(size);
        }

        match (self, value) {
            (Scheme::String, BufferValue::String(s)) => Ok(2 + string_len(s)?),
            (Scheme::List(item), BufferValue::List(items)) => {
                let mut size = 4;
                for v in items {
                    size += item.size_of(v)?;
                }
                Ok(size)
            }
            (Scheme::FixedList(item, len), BufferValue::List(items)) => {
                check_len(*len, items.len())?;
                let mut size = 0;
                for v in items {
                    size += item.size_of(v)?;
                }
                Ok(size)
            }
            (Scheme::Object(fields), BufferValue::Object(_)) => {
                let mut size = 0;
                for (name, scheme) in fields {
                    size += scheme.size_of(value.field(name)?)?;
                }
                Ok(size)
            }
            (Scheme::Record(scheme), BufferValue::Record(entries)) => {
                let mut size = 4;
                for (key, v) in entries {
                    size += 2 + string_len(key)? + scheme.size_of(v)?;
                }
                Ok(size)
            }
            (Scheme::Keyed(_), BufferValue::Keyed(key, v)) => {
                Ok(2 + string_len(key)? + self.variant(key)?.size_of(v)?)
            }
            _ => Err(mismatch(self, value)),
        }
    }

    /// Read one value at `offset`, returning it with the number of bytes consumed.
    pub fn read(&self, buf: &[u8], offset: usize) -> Result<(BufferValue, usize)> {
        match self {
            Scheme::Bool => Ok((BufferValue::Bool(take::<1>(buf, offset)?[0] != 0), 1)),
            Scheme::Byte => Ok((BufferValue::Byte(take::<1>(buf, offset)?[0]), 1)),
            Scheme::Short => Ok((
                BufferValue::Short(i16::from_be_bytes(take(buf, offset)?)),
                2,
            )),
            Scheme::Int => Ok((BufferValue::Int(i32::from_be_bytes(take(buf, offset)?)), 4)),
            Scheme::String => {
                let (s, size) = read_string(buf, offset)?;
                Ok((BufferValue::String(s), size))
            }
            Scheme::List(item) => {
                let count = u32::from_be_bytes(take(buf, offset)?) as usize;
                let mut cursor = offset + 4;
                let mut items = Vec::with_capacity(count.min(buf.len()));
                for _ in 0..count {
                    let (v, size) = item.read(buf, cursor)?;
                    items.push(v);
                    cursor += size;
                }
                Ok((BufferValue::List(items), cursor - offset))
            }
            Scheme::FixedList(item, len) => {
                let mut cursor = offset;
                let mut items = Vec::with_capacity(*len);
                for _ in 0..*len {
                    let (v, size) = item.read(buf, cursor)?;
                    items.push(v);
                    cursor += size;
                }
                Ok((BufferValue::List(items), cursor - offset))
            }
            Scheme::Object(fields) => {
                let mut cursor = offset;
                let mut values = Vec::with_capacity(fields.len());
                for (name, scheme) in fields {
                    let (v, size) = scheme.read(buf, cursor)?;
                    values.push((name.clone(), v));
                    cursor += size;
                }
                Ok((BufferValue::Object(values), cursor - offset))
            }
            Scheme::Record(scheme) => {
                let count = u32::from_be_bytes(take(buf, offset)?) as usize;
                let mut cursor = offset + 4;
                let mut entries = Vec::with_capacity(count.min(buf.len()));
                for _ in 0..count {
                    let (key, key_size) = read_string(buf, cursor)?;
                    cursor += key_size;
                    let (v, size) = scheme.read(buf, cursor)?;
                    cursor += size;
                    entries.push((key, v));
                }
                Ok((BufferValue::Record(entries), cursor - offset))
            }
            Scheme::Keyed(_) => {
                let (key, key_size) = read_string(buf, offset)?;
                let (v, size) = self.variant(&key)?.read(buf, offset + key_size)?;
                Ok((BufferValue::keyed(key, v), key_size + size))
            }
        }
    }

    /// Write `value` at `offset`, returning the number of bytes written.
    pub fn write(&self, buf: &mut [u8], offset: usize, value: &BufferValue) -> Result<usize> {
        match (self, value) {
            (Scheme::Bool, BufferValue::Bool(v)) => put(buf, offset, &[*v as u8]),
            (Scheme::Byte, BufferValue::Byte(v)) => put(buf, offset, &[*v]),
            (Scheme::Short, BufferValue::Short(v)) => put(buf, offset, &v.to_be_bytes()),
            (Scheme::Int, BufferValue::Int(v)) => put(buf, offset, &v.to_be_bytes()),
            (Scheme::String, BufferValue::String(s)) => write_string(buf, offset, s),
            (Scheme::List(item), BufferValue::List(items)) => {
                let count = u32::try_from(items.len()).map_err(|_| {
                    ArchitectError::SchemeMismatch(format!("list of {} items", items.len()))
                })?;
                let mut cursor = offset + put(buf, offset, &count.to_be_bytes())?;
                for v in items {
                    cursor += item.write(buf, cursor, v)?;
                }
                Ok(cursor - offset)
            }
            (Scheme::FixedList(item, len), BufferValue::List(items)) => {
                check_len(*len, items.len())?;
                let mut cursor = offset;
                for v in items {
                    cursor += item.write(buf, cursor, v)?;
                }
                Ok(cursor - offset)
            }
            (Scheme::Object(fields), BufferValue::Object(_)) => {
                let mut cursor = offset;
                for (name, scheme) in fields {
                    cursor += scheme.write(buf, cursor, value.field(name)?)?;
                }
                Ok(cursor - offset)
            }
            (Scheme::Record(scheme), BufferValue::Record(entries)) => {
                let count = u32::try_from(entries.len()).map_err(|_| {
                    ArchitectError::SchemeMismatch(format!("record of {} entries", entries.len()))
                })?;
                let mut cursor = offset + put(buf, offset, &count.to_be_bytes())?;
                for (key, v) in entries {
                    cursor += write_string(buf, cursor, key)?;
                    cursor += scheme.write(buf, cursor, v)?;
                }
                Ok(cursor - offset)
            }
            (Scheme::Keyed(_), BufferValue::Keyed(key, v)) => {
                let scheme = self.variant(key)?;
                let key_size = write_string(buf, offset, key)?;
                Ok(key_size + scheme.write(buf, offset + key_size, v)?)
            }
            _ => Err(mismatch(self, value)),
        }
    }

    /// Encode into an exactly sized buffer.
    pub fn write_all(&self, value: &BufferValue) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size_of(value)?];
        let written = self.write(&mut buf, 0, value)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Decode a value starting at the beginning of `buf`.
    pub fn read_all(&self, buf: &[u8]) -> Result<BufferValue> {
        self.read(buf, 0).map(|(value, _)| value)
    }

    fn check_shape(&self, value: &BufferValue) -> Result<()> {
        match (self, value) {
            (Scheme::Bool, BufferValue::Bool(_))
            | (Scheme::Byte, BufferValue::Byte(_))
            | (Scheme::Short, BufferValue::Short(_))
            | (Scheme::Int, BufferValue::Int(_)) => Ok(()),
            (Scheme::FixedList(item, len), BufferValue::List(items)) => {
                check_len(*len, items.len())?;
                items.iter().try_for_each(|v| item.check_shape(v))
            }
            (Scheme::Object(fields), BufferValue::Object(_)) => fields
                .iter()
                .try_for_each(|(name, scheme)| scheme.check_shape(value.field(name)?)),
            _ => Err(mismatch(self, value)),
        }
    }
}

fn mismatch(scheme: &Scheme, value: &BufferValue) -> ArchitectError {
    ArchitectError::SchemeMismatch(format!("{:?} cannot encode {:?}", scheme, value))
}

fn check_len(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ArchitectError::SchemeMismatch(format!(
            "fixed list of {} items given {}",
            expected, found
        )))
    }
}

fn string_len(s: &str) -> Result<usize> {
    if s.len() > u16::MAX as usize {
        return Err(ArchitectError::StringTooLong(s.len()));
    }
    Ok(s.len())
}

fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    buf.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ArchitectError::BufferUnderflow {
            offset,
            needed: N,
            available: buf.len().saturating_sub(offset),
        })
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) -> Result<usize> {
    let available = buf.len().saturating_sub(offset);
    let target = buf
        .get_mut(offset..offset + bytes.len())
        .ok_or(ArchitectError::BufferUnderflow {
            offset,
            needed: bytes.len(),
            available,
        })?;
    target.copy_from_slice(bytes);
    Ok(bytes.len())
}

fn read_string(buf: &[u8], offset: usize) -> Result<(String, usize)> {
    let len = u16::from_be_bytes(take(buf, offset)?) as usize;
    let start = offset + 2;
    let bytes = buf
        .get(start..start + len)
        .ok_or(ArchitectError::BufferUnderflow {
            offset: start,
            needed: len,
            available: buf.len().saturating_sub(start),
        })?;
    let s = String::from_utf8(bytes.to_vec())
        .map_err(|e| ArchitectError::SchemeMismatch(format!("invalid UTF-8 string: {}", e)))?;
    Ok((s, 2 + len))
}

fn write_string(buf: &mut [u8], offset: usize, s: &str) -> Result<usize> {
    let len = string_len(s)? as u16;
    put(buf, offset, &len.to_be_bytes())?;
    put(buf, offset + 2, s.as_bytes())?;
    Ok(2 + s.len())
}
