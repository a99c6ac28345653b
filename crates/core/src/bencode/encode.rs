//! Bencode encoder.

use super::value::{Dict, Value};

/// Encodes a value into its canonical byte form.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

/// Appends the canonical encoding of `value` to `out`.
pub fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Integer(i) => {
            out.push(b'i');
            out.extend_from_slice(i.to_string().as_bytes());
            out.push(b'e');
        }
        Value::Bytes(bytes) => encode_bytes(bytes.as_bytes(), out),
        Value::List(items) => {
            out.push(b'l');
            for item in items {
                encode_into(item, out);
            }
            out.push(b'e');
        }
        Value::Dict(dict) => encode_dict(dict, out),
    }
}

/// Encodes a dictionary as a top-level document.
pub fn encode_document(dict: &Dict) -> Vec<u8> {
    let mut out = Vec::new();
    encode_dict(dict, &mut out);
    out
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}

fn encode_dict(dict: &Dict, out: &mut Vec<u8>) {
    let mut entries: Vec<_> = dict.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    out.push(b'd');
    for (key, value) in entries {
        encode_bytes(key.as_bytes(), out);
        encode_into(value, out);
    }
    out.push(b'e');
}

#[cfg(test)]
mod tests {
    use super::super::decode::decode;
    use super::super::value::{ByteString, Dict};
    use super::*;
    use num_bigint::BigInt;

    fn dict(entries: &[(&str, Value)]) -> Value {
        Value::Dict(
            entries
                .iter()
                .map(|(k, v)| (ByteString::from(*k), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::from(42_i64)), b"i42e");
        assert_eq!(encode(&Value::from(-7_i64)), b"i-7e");
        assert_eq!(encode(&Value::from(0_i64)), b"i0e");
        assert_eq!(encode(&Value::from("spam")), b"4:spam");
        assert_eq!(encode(&Value::from("")), b"0:");
    }

    #[test]
    fn test_encode_list() {
        let value = Value::List(vec![Value::from("a"), Value::from(1_i64)]);
        assert_eq!(encode(&value), b"l1:ai1ee");
    }

    #[test]
    fn test_encode_dict_sorts_keys() {
        let ba = dict(&[("b", Value::from(1_i64)), ("a", Value::from(2_i64))]);
        let ab = dict(&[("a", Value::from(2_i64)), ("b", Value::from(1_i64))]);
        assert_eq!(encode(&ba), encode(&ab));
        assert_eq!(encode(&ba), b"d1:ai2e1:bi1ee");
    }

    #[test]
    fn test_encode_sorts_by_raw_bytes() {
        // Uppercase sorts before lowercase; a prefix sorts before its extensions.
        let value = dict(&[
            ("ab", Value::from(1_i64)),
            ("a", Value::from(2_i64)),
            ("B", Value::from(3_i64)),
        ]);
        assert_eq!(encode(&value), b"d1:Bi3e1:ai2e2:abi1ee");
    }

    #[test]
    fn test_round_trip_nested() {
        let value = dict(&[
            ("announce", Value::from("http://tracker.example/announce")),
            (
                "info",
                dict(&[
                    ("name", Value::from("Album [FLAC]")),
                    ("piece length", Value::from(262144_i64)),
                    ("pieces", Value::from(vec![0u8, 0xff, 0x10, 0x80])),
                    (
                        "files",
                        Value::List(vec![dict(&[
                            ("length", Value::from(1234_i64)),
                            ("path", Value::List(vec![Value::from("01.flac")])),
                        ])]),
                    ),
                ]),
            ),
        ]);

        let bytes = encode(&value);
        let (decoded, rest) = decode(&bytes).unwrap();
        assert_eq!(decoded, value);
        assert!(rest.is_empty());
    }

    fn assert_round_trip(value: &Value) {
        let bytes = encode(value);
        let (decoded, rest) = decode(&bytes).unwrap();
        assert_eq!(&decoded, value, "encoded as {:?}", String::from_utf8_lossy(&bytes));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_round_trip_negative_big_integer() {
        let big: BigInt = "-123456789012345678901234567890".parse().unwrap();
        let value = Value::from(big);
        assert_eq!(encode(&value), b"i-123456789012345678901234567890e");
        assert_round_trip(&value);
        assert_round_trip(&Value::List(vec![
            Value::from(i64::MIN),
            Value::from(i64::MAX),
        ]));
    }

    #[test]
    fn test_round_trip_empty_containers() {
        let empty_list = Value::List(Vec::new());
        let empty_dict = Value::Dict(Dict::new());
        assert_eq!(encode(&empty_list), b"le");
        assert_eq!(encode(&empty_dict), b"de");
        assert_round_trip(&empty_list);
        assert_round_trip(&empty_dict);
        assert_round_trip(&Value::List(vec![empty_list.clone(), empty_dict.clone()]));
        assert_round_trip(&dict(&[("l", empty_list), ("d", empty_dict)]));
    }

    #[test]
    fn test_round_trip_non_utf8_keys() {
        let mut entries = Dict::new();
        entries.insert(ByteString::from(vec![0xff_u8, 0x00]), Value::from(1_i64));
        entries.insert(ByteString::from(vec![0x80_u8]), Value::from(vec![0xfe_u8, 0xfd]));
        entries.insert(ByteString::from("name"), Value::from("x"));
        let value = Value::Dict(entries);

        assert_eq!(
            encode(&value),
            b"d4:name1:x1:\x802:\xfe\xfd2:\xff\x00i1ee".to_vec()
        );
        assert_round_trip(&value);
    }

    #[test]
    fn test_reencode_sorted_input_is_byte_identical() {
        let input: &[u8] = b"d8:announce3:url4:infod6:lengthi5e4:name1:xee";
        let (value, _) = decode(input).unwrap();
        assert_eq!(encode(&value), input);
    }

    #[test]
    fn test_reencode_unsorted_input_sorts_it() {
        let (value, _) = decode(b"d1:bi1e1:ai2ee").unwrap();
        assert_eq!(encode(&value), b"d1:ai2e1:bi1ee");
    }
}
