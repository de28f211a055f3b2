//! # memlens-types
//!
//! C header schema extraction for memlens.
//!
//! This crate provides:
//! - A preprocessor and tokenizer for header text
//! - A parser for struct, union, enum and typedef declarations
//! - Struct and union layout for a 32-bit target (4-byte alignment)
//! - A type registry that the decoder reads as its schema
//!
//! # Example
//!
//! ```
//! use memlens_types::parse_header;
//!
//! let (registry, _diagnostics) = parse_header(
//!     "typedef struct Manager { char a; int level; } Manager;",
//! ).unwrap();
//!
//! assert_eq!(registry.size_of("Manager"), Some(8));
//! assert_eq!(registry.get_struct("Manager").unwrap().offset_of("level"), Some(4));
//! ```

pub mod declaration;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod source;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Location, Severity};
pub use error::{LayoutError, ParseError, ParseResult};
pub use parser::{parse_header, HeaderParser};
pub use registry::{RegistryStats, TypeKind, TypeRegistry};
pub use source::{FsHeaderSource, HeaderSource, MemoryHeaderSource};
pub use types::*;
