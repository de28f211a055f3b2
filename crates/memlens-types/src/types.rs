//! Schema data model.
//!
//! This module defines the pieces a parsed header is reduced to: field
//! descriptors, aggregate (struct/union) and enum definitions, and the
//! tagged [`TypeRef`] returned by registry lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte boundary to which struct runs and union sizes are rounded.
pub const ALIGNMENT: usize = 4;

/// Size of a machine word on the 32-bit target, and of every pointer.
pub const WORD_SIZE: usize = 4;

/// Size of every enum-typed value (`sizeof(int)`).
pub const ENUM_SIZE: usize = 4;

/// Reserved prefix of synthesized names for untagged aggregates and enums.
pub const ANONYMOUS_PREFIX: &str = "_ANONYMOUS_";

/// Check whether a type name was synthesized for an untagged definition.
pub fn is_anonymous_name(name: &str) -> bool {
    name.starts_with(ANONYMOUS_PREFIX)
}

/// Struct or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    /// The C keyword introducing this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One declared member or variable.
///
/// A declaration like `char *argv[2];` becomes
/// `type_name = "char"`, `var_name = "argv"`, `array_len = 2`,
/// `is_pointer = true`, `byte_size = 8`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Scalar keyword or registered aggregate/enum name.
    pub type_name: String,
    /// Variable name (empty for padding).
    pub var_name: String,
    /// Number of elements, 0 for a non-array.
    pub array_len: usize,
    /// Whether the declarator carries a `*`.
    pub is_pointer: bool,
    /// Total size in bytes, array multiplication included.
    pub byte_size: usize,
    /// Synthetic alignment filler inserted by the layout pass.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub padding: bool,
}

impl FieldDecl {
    pub fn new(type_name: impl Into<String>, var_name: impl Into<String>, byte_size: usize) -> Self {
        Self {
            type_name: type_name.into(),
            var_name: var_name.into(),
            array_len: 0,
            is_pointer: false,
            byte_size,
            padding: false,
        }
    }

    /// A padding field covering `size` bytes.
    pub fn padding(size: usize) -> Self {
        Self {
            type_name: "char".to_string(),
            var_name: String::new(),
            array_len: 0,
            is_pointer: false,
            byte_size: size,
            padding: true,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_len > 0
    }

    /// Size of one element.
    pub fn element_size(&self) -> usize {
        if self.array_len > 0 {
            self.byte_size / self.array_len
        } else {
            self.byte_size
        }
    }

    /// Format as a C member declaration (without the trailing `;`).
    pub fn to_c_string(&self) -> String {
        if self.padding {
            return format!("char <padding>[{}]", self.byte_size);
        }

        let type_name = if is_anonymous_name(&self.type_name) {
            "<anonymous>"
        } else {
            self.type_name.as_str()
        };
        let mut result = format!(
            "{} {}{}",
            type_name,
            if self.is_pointer { "*" } else { "" },
            self.var_name
        );
        if self.array_len > 0 {
            result.push_str(&format!("[{}]", self.array_len));
        }
        result
    }
}

/// A struct or union definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDef {
    /// Registry name (tag, typedef alias, or synthesized anonymous name).
    pub name: String,
    pub kind: AggregateKind,
    /// Members in declaration order; for structs this includes padding.
    pub members: Vec<FieldDecl>,
    /// Final size in bytes; 0 when the layout could not be computed.
    pub size: usize,
}

impl AggregateDef {
    pub fn is_anonymous(&self) -> bool {
        is_anonymous_name(&self.name)
    }

    /// Members excluding synthetic padding.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter(|m| !m.padding)
    }

    /// Field by variable name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDecl> {
        self.fields().find(|f| f.var_name == name)
    }

    /// Members paired with their byte offset from the aggregate start.
    pub fn member_offsets(&self) -> Vec<(usize, &FieldDecl)> {
        let mut offset = 0;
        self.members
            .iter()
            .map(|m| match self.kind {
                AggregateKind::Union => (0, m),
                AggregateKind::Struct => {
                    let at = offset;
                    offset += m.byte_size;
                    (at, m)
                }
            })
            .collect()
    }

    /// Offset of a named field.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.member_offsets()
            .into_iter()
            .find(|(_, m)| !m.padding && m.var_name == name)
            .map(|(offset, _)| offset)
    }
}

/// An enumeration: ordered `(label, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub labels: Vec<(String, i64)>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
        }
    }

    pub fn add_label(&mut self, label: impl Into<String>, value: i64) {
        self.labels.push((label.into(), value));
    }

    /// Get value by label.
    pub fn value_of(&self, label: &str) -> Option<i64> {
        self.labels
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    /// First label carrying `value`.
    pub fn label_of(&self, value: i64) -> Option<&str> {
        self.labels
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(l, _)| l.as_str())
    }

    pub fn is_anonymous(&self) -> bool {
        is_anonymous_name(&self.name)
    }
}

/// Result of resolving a type name against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef<'a> {
    Scalar { name: &'a str, size: usize },
    Struct(&'a AggregateDef),
    Union(&'a AggregateDef),
    Enum(&'a EnumDef),
    Unresolved,
}

impl<'a> TypeRef<'a> {
    /// Size in bytes, `None` when unresolved.
    pub fn size(&self) -> Option<usize> {
        match self {
            TypeRef::Scalar { size, .. } => Some(*size),
            TypeRef::Struct(def) | TypeRef::Union(def) => Some(def.size),
            TypeRef::Enum(_) => Some(ENUM_SIZE),
            TypeRef::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, TypeRef::Unresolved)
    }

    /// The aggregate definition for struct and union references.
    pub fn as_aggregate(&self) -> Option<&'a AggregateDef> {
        match self {
            TypeRef::Struct(def) | TypeRef::Union(def) => Some(def),
            _ => None,
        }
    }
}
