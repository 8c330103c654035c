use archiv::{from_bytes, to_bytes, DecodeError, Reader};
use proptest::collection::{hash_map, vec};
use proptest::prelude::*;
use std::collections::HashMap;

proptest! {
    #[test]
    fn integers_roundtrip(value in any::<i64>()) {
        let decoded: i64 = from_bytes(&to_bytes(&value, 0).unwrap()).unwrap();
        prop_assert_eq!(value, decoded);
    }

    #[test]
    fn floats_roundtrip_bit_exact(value in any::<f64>()) {
        let decoded: f64 = from_bytes(&to_bytes(&value, 0).unwrap()).unwrap();
        prop_assert_eq!(value.to_bits(), decoded.to_bits());
    }

    #[test]
    fn unsigned_are_big_endian(value in any::<u32>()) {
        let bytes = to_bytes(&value, 0).unwrap();
        prop_assert_eq!(&bytes[16..], &value.to_be_bytes()[..]);
    }

    #[test]
    fn sequences_carry_their_length(items in vec(any::<u8>(), 0..64)) {
        let bytes = to_bytes(&items, 0).unwrap();
        prop_assert_eq!(&bytes[16..24], &(items.len() as i64).to_be_bytes()[..]);
        prop_assert_eq!(bytes.len(), 24 + items.len());
        let decoded: Vec<u8> = from_bytes(&bytes).unwrap();
        prop_assert_eq!(items, decoded);
    }

    #[test]
    fn optionals_spend_one_tag_byte(value in proptest::option::of(any::<u16>())) {
        let bytes = to_bytes(&value, 0).unwrap();
        match value {
            None => prop_assert_eq!(&bytes[16..], &[0x00][..]),
            Some(v) => {
                prop_assert_eq!(bytes[16], 0x01);
                prop_assert_eq!(&bytes[17..], &v.to_be_bytes()[..]);
            }
        }
        let decoded: Option<u16> = from_bytes(&bytes).unwrap();
        prop_assert_eq!(value, decoded);
    }

    #[test]
    fn repeated_strings_pay_their_payload_once(
        content in "[a-z]{1,20}",
        count in 1usize..5,
    ) {
        let items = vec![content.clone(); count];
        let bytes = to_bytes(&items, 0).unwrap();
        let occurrences = bytes
            .windows(content.len())
            .filter(|w| *w == content.as_bytes())
            .count();
        prop_assert_eq!(occurrences, 1);
        let decoded: Vec<String> = from_bytes(&bytes).unwrap();
        prop_assert_eq!(items, decoded);
    }

    #[test]
    fn string_vectors_roundtrip(items in vec("[a-zA-Z0-9 äöüß]{0,12}", 0..16)) {
        let decoded: Vec<String> = from_bytes(&to_bytes(&items, 0).unwrap()).unwrap();
        prop_assert_eq!(items, decoded);
    }

    #[test]
    fn mappings_roundtrip_as_pair_sets(entries in hash_map("[a-z]{1,8}", any::<i64>(), 0..16)) {
        let decoded: HashMap<String, i64> = from_bytes(&to_bytes(&entries, 0).unwrap()).unwrap();
        prop_assert_eq!(entries, decoded);
    }

    #[test]
    fn version_gate_rejects_everything_but_one(header in any::<i64>(), value in any::<u8>()) {
        prop_assume!(header != archiv::ENCODING_VERSION);
        let mut bytes = to_bytes(&value, 0).unwrap();
        bytes[..8].copy_from_slice(&header.to_be_bytes());
        match from_bytes::<u8>(&bytes) {
            Err(DecodeError::IncompatibleArchiver(seen)) => prop_assert_eq!(seen, header),
            other => prop_assert!(false, "expected version gate, got {:?}", other),
        }
    }

    #[test]
    fn user_version_is_opaque(version in any::<i64>(), value in any::<u32>()) {
        let bytes = to_bytes(&value, version).unwrap();
        let mut source = bytes.as_slice();
        let mut reader = Reader::new(&mut source);
        let decoded: u32 = reader.read_root().unwrap();
        prop_assert_eq!(value, decoded);
        prop_assert_eq!(version, reader.user_version());
    }
}
