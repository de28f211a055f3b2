//! # memlens-decode
//!
//! Decodes a raw memory dump against a schema extracted by `memlens-types`.
//!
//! The result is a typed tree of the decoded fields, printable as indented
//! text or serializable as JSON.
//!
//! # Example
//!
//! ```
//! use memlens_decode::decode;
//! use memlens_types::parse_header;
//!
//! let (registry, _) = parse_header("struct Manager { char a; int level; };").unwrap();
//! let data = [b'M', 0, 0, 0, 3, 0, 0, 0];
//! let report = decode(&registry, "Manager", &data).unwrap();
//!
//! assert_eq!(
//!     report.to_string(),
//!     "struct Manager {\n    a =  77, 0x4d, 'M'\n    level =   3, 0x00000003\n}\n"
//! );
//! ```

pub mod cursor;
pub mod decoder;
pub mod error;
pub mod render;
pub mod value;

pub use decoder::{decode, Decoder, Report, UNKNOWN_LABEL};
pub use error::{DecodeError, DecodeResult};
pub use value::{DecodedAggregate, DecodedField, FieldValue, ScalarValue};
