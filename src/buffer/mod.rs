//! Composable binary codecs.
//!
//! A [`Scheme`] describes a layout; [`BufferValue`] is the matching dynamic value.
//! `size_of` gives the exact encoded length, so a writer can allocate once and
//! then `write` in place. Every scheme reads back exactly the bytes it wrote.
//!
//! ```
//! use schematic_architect::buffer::{BufferValue, Scheme};
//!
//! let scheme = Scheme::object([("name", Scheme::String), ("ids", Scheme::list(Scheme::Int))]);
//! let value = BufferValue::object([
//!     ("name", BufferValue::from("stone")),
//!     ("ids", BufferValue::int_list([1, 2, 3])),
//! ]);
//! let bytes = scheme.write_all(&value).unwrap();
//! assert_eq!(bytes.len(), 2 + 5 + 4 + 3 * 4);
//! assert_eq!(scheme.read_all(&bytes).unwrap(), value);
//! ```

mod scheme;
mod value;

pub use scheme::Scheme;
pub use value::BufferValue;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchitectError;

    fn round_trip(scheme: &Scheme, value: BufferValue) {
        let bytes = scheme.write_all(&value).unwrap();
        assert_eq!(bytes.len(), scheme.size_of(&value).unwrap());
        let (back, read) = scheme.read(&bytes, 0).unwrap();
        assert_eq!(read, bytes.len());
        assert_eq!(back, value);
    }

    #[test]
    fn test_primitive_edges() {
        round_trip(&Scheme::Bool, BufferValue::Bool(true));
        round_trip(&Scheme::Byte, BufferValue::Byte(u8::MAX));
        round_trip(&Scheme::Short, BufferValue::Short(0));
        round_trip(&Scheme::Short, BufferValue::Short(i16::MAX));
        round_trip(&Scheme::Short, BufferValue::Short(i16::MIN));
        round_trip(&Scheme::Int, BufferValue::Int(i32::MAX));
        round_trip(&Scheme::Int, BufferValue::Int(-1));
        round_trip(&Scheme::String, BufferValue::from(""));
        round_trip(&Scheme::String, BufferValue::from("minecraft:oak_log[axis=y]"));
    }

    #[test]
    fn test_big_endian_layout() {
        let bytes = Scheme::Int.write_all(&BufferValue::Int(0x0102_0304)).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);

        let bytes = Scheme::list(Scheme::Short)
            .write_all(&BufferValue::List(vec![BufferValue::Short(-2)]))
            .unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 1, 0xff, 0xfe]);
    }

    #[test]
    fn test_string_size_counts_utf8_bytes() {
        let value = BufferValue::from("é✓");
        assert_eq!(Scheme::String.size_of(&value).unwrap(), 2 + 5);
        round_trip(&Scheme::String, value);
    }

    #[test]
    fn test_string_too_long() {
        let value = BufferValue::String("x".repeat(u16::MAX as usize + 1));
        assert!(matches!(
            Scheme::String.size_of(&value),
            Err(ArchitectError::StringTooLong(65536))
        ));
        round_trip(&Scheme::String, BufferValue::String("x".repeat(u16::MAX as usize)));
    }

    #[test]
    fn test_lists() {
        round_trip(&Scheme::list(Scheme::Int), BufferValue::List(vec![]));
        round_trip(
            &Scheme::list(Scheme::fixed_list(Scheme::Int, 4)),
            BufferValue::List(vec![
                BufferValue::int_list([1, -2, 3, 0]),
                BufferValue::int_list([i32::MAX, 0, 0, i32::MIN]),
            ]),
        );
        round_trip(
            &Scheme::fixed_list(Scheme::String, 2),
            BufferValue::from(vec!["a", ""]),
        );
        round_trip(&Scheme::fixed_list(Scheme::Int, 0), BufferValue::List(vec![]));
    }

    #[test]
    fn test_fixed_list_length_is_enforced() {
        let scheme = Scheme::fixed_list(Scheme::Int, 3);
        let err = scheme.write_all(&BufferValue::int_list([1, 2])).unwrap_err();
        assert!(matches!(err, ArchitectError::SchemeMismatch(_)));
        assert_eq!(scheme.fixed_size(), Some(12));
    }

    #[test]
    fn test_object_uses_scheme_order() {
        let scheme = Scheme::object([("a", Scheme::Byte), ("b", Scheme::Short)]);
        // fields given out of order still encode in scheme order
        let value = BufferValue::object([
            ("b", BufferValue::Short(0x0203)),
            ("a", BufferValue::Byte(1)),
        ]);
        let bytes = scheme.write_all(&value).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let back = scheme.read_all(&bytes).unwrap();
        assert_eq!(back.field("a").unwrap(), &BufferValue::Byte(1));
        assert_eq!(back.field("b").unwrap().as_short().unwrap(), 0x0203);

        let missing = BufferValue::object([("a", BufferValue::Byte(1))]);
        assert!(scheme.write_all(&missing).is_err());
    }

    #[test]
    fn test_keyed_union() {
        let scheme = Scheme::keyed([
            ("int", Scheme::Int),
            ("names", Scheme::list(Scheme::String)),
        ]);
        round_trip(&scheme, BufferValue::keyed("int", BufferValue::Int(7)));
        round_trip(
            &scheme,
            BufferValue::keyed("names", BufferValue::from(vec!["x", "y"])),
        );

        let bytes = scheme
            .write_all(&BufferValue::keyed("int", BufferValue::Int(7)))
            .unwrap();
        assert_eq!(&bytes[..5], &[0, 3, b'i', b'n', b't']);

        let err = scheme
            .write_all(&BufferValue::keyed("float", BufferValue::Int(7)))
            .unwrap_err();
        assert!(matches!(err, ArchitectError::UnknownKey(ref k) if k == "float"));
    }

    #[test]
    fn test_record() {
        let scheme = Scheme::record(Scheme::Int);
        round_trip(&scheme, BufferValue::Record(vec![]));
        round_trip(
            &scheme,
            BufferValue::Record(vec![
                ("stone".into(), BufferValue::Int(3)),
                ("dirt".into(), BufferValue::Int(0)),
            ]),
        );
    }

    #[test]
    fn test_truncated_input_underflows() {
        let scheme = Scheme::list(Scheme::Int);
        let bytes = scheme.write_all(&BufferValue::int_list([1, 2])).unwrap();
        let err = scheme.read(&bytes[..bytes.len() - 1], 0).unwrap_err();
        assert!(matches!(
            err,
            ArchitectError::BufferUnderflow { offset: 8, needed: 4, available: 3 }
        ));
    }

    #[test]
    fn test_write_into_short_buffer_fails() {
        let mut buf = [0u8; 3];
        let err = Scheme::Int.write(&mut buf, 0, &BufferValue::Int(1)).unwrap_err();
        assert!(matches!(err, ArchitectError::BufferUnderflow { .. }));
    }

    #[test]
    fn test_read_at_offset() {
        let mut buf = vec![0xAA; 2];
        buf.extend(Scheme::Short.write_all(&BufferValue::Short(9)).unwrap());
        assert_eq!(
            Scheme::Short.read(&buf, 2).unwrap(),
            (BufferValue::Short(9), 2)
        );
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            Scheme::Int.size_of(&BufferValue::from("1")),
            Err(ArchitectError::SchemeMismatch(_))
        ));
        assert!(BufferValue::Int(1).as_str().is_err());
    }
}
