//! Bencode value codec.
//!
//! Encodes and decodes the recursive format used by `.torrent` files:
//!
//! - Integer: `i<digits>e`, optionally negative
//! - Byte string: `<length>:<bytes>`
//! - List: `l<value>*e`
//! - Dictionary: `d(<byte string><value>)*e`
//!
//! Encoding is canonical: dictionary keys are always written sorted by raw
//! byte comparison and numbers without leading zeros. Decoding is lenient
//! so that files from sloppy producers can still be read: keys may come in
//! any order and numbers may carry leading zeros or be written `-0`.
//! Duplicate keys are rejected.
//!
//! # Example
//!
//! ```
//! use transpack_core::bencode::{decode, encode, Value};
//!
//! let (value, rest) = decode(b"d1:bi1e1:ai2ee").unwrap();
//! assert!(rest.is_empty());
//! assert_eq!(encode(&value), b"d1:ai2e1:bi1ee");
//! ```

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_document, MAX_DEPTH};
pub use encode::{encode, encode_document, encode_into};
pub use error::CodecError;
pub use value::{ByteString, Dict, Value};
