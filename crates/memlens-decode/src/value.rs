//! Decoded value tree.

use memlens_types::AggregateKind;
use serde::Serialize;

/// A decoded struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedAggregate {
    pub kind: AggregateKind,
    pub type_name: String,
    /// Synthesized name; rendered without a name.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
    /// Byte offset of the aggregate within the buffer.
    pub offset: usize,
    pub size: usize,
    /// Fields in declaration order, padding excluded.
    pub fields: Vec<DecodedField>,
}

impl DecodedAggregate {
    pub fn field(&self, name: &str) -> Option<&DecodedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Follow a dotted path such as `person.home`.
    pub fn lookup(&self, path: &str) -> Option<&FieldValue> {
        let mut parts = path.split('.');
        let mut value = &self.field(parts.next()?)?.value;
        for part in parts {
            value = &value.as_aggregate()?.field(part)?.value;
        }
        Some(value)
    }
}

/// One named field and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedField {
    pub name: String,
    pub offset: usize,
    pub value: FieldValue,
}

/// Value of a field or array element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(ScalarValue),
    Aggregate(DecodedAggregate),
    Array(Vec<FieldValue>),
    /// The member type is not in the registry.
    Unresolved { type_name: String },
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&DecodedAggregate> {
        match self {
            FieldValue::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// A scalar, enum or pointer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarValue {
    pub type_name: String,
    /// Number of bytes interpreted.
    pub width: usize,
    /// Unsigned value of the little-endian bytes.
    pub value: u64,
    /// Bytes most significant first, `0x` prefixed.
    pub hex: String,
    /// Enum label, or `Unknown` when no label matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Printable character of a `char` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<char>,
    /// Some bytes lay past the end of the buffer and read as zero.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ScalarValue {
    pub fn new(type_name: impl Into<String>, width: usize, value: u64) -> Self {
        Self {
            type_name: type_name.into(),
            width,
            value,
            hex: format!("0x{:0w$x}", value, w = width * 2),
            label: None,
            character: None,
            truncated: false,
        }
    }

    /// Value sign-extended from `width` bytes.
    pub fn signed(&self) -> i64 {
        match self.width {
            0 => 0,
            w if w >= 8 => self.value as i64,
            w => {
                let shift = 64 - 8 * w as u32;
                ((self.value << shift) as i64) >> shift
            }
        }
    }
}
