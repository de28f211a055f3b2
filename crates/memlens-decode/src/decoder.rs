//! Schema-driven decoding of a byte buffer.
//!
//! The decoder walks a struct or union definition from the registry and
//! reads each member from the buffer:
//! - struct members are read one after another; padding is skipped
//! - every union member is read from the union's own start offset, and the
//!   cursor moves past the union by its full size afterwards
//! - array elements are read one element size apart
//! - scalars are little-endian; `char` interprets only its first byte
//! - pointers are read as machine words and never followed
//!
//! Problems that do not prevent a best-effort rendering (short buffer,
//! unresolved member type) become diagnostics on the [`Report`].

use crate::cursor::Cursor;
use crate::error::{DecodeError, DecodeResult};
use crate::value::{DecodedAggregate, DecodedField, FieldValue, ScalarValue};
use memlens_types::{
    AggregateDef, AggregateKind, DiagnosticKind, Diagnostics, EnumDef, FieldDecl, TypeRef,
    TypeRegistry, WORD_SIZE,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Label used when an enum value matches no enumerator.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Result of one decode: the value tree and what went wrong on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub root: DecodedAggregate,
    pub buffer_len: usize,
    pub diagnostics: Diagnostics,
}

impl Report {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

/// Decodes buffers against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Decode `data` as the struct or union `type_name`.
    pub fn decode(&self, type_name: &str, data: &[u8]) -> DecodeResult<Report> {
        let def = self
            .registry
            .resolve(type_name)
            .as_aggregate()
            .ok_or_else(|| DecodeError::UnknownType(type_name.to_string()))?;

        let mut walk = Walk {
            registry: self.registry,
            cursor: Cursor::new(data),
            diagnostics: Diagnostics::new(),
            active: Vec::new(),
            overrun_reported: false,
        };

        if data.len() != def.size {
            walk.diagnostics.debug(
                DiagnosticKind::SizeMismatch,
                format!(
                    "buffer is {} bytes but {} {} is {} bytes",
                    data.len(),
                    def.kind,
                    def.name,
                    def.size
                ),
                None,
            );
        }

        tracing::debug!(type_name, len = data.len(), "decoding buffer");
        let root = walk.aggregate(def, 0);

        Ok(Report {
            root,
            buffer_len: data.len(),
            diagnostics: walk.diagnostics,
        })
    }

    /// Read a whole dump file and decode it.
    pub fn decode_file(&self, type_name: &str, path: &Path) -> DecodeResult<Report> {
        let data = std::fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode(type_name, &data)
    }
}

/// Decode `data` as `type_name` against `registry`.
pub fn decode(registry: &TypeRegistry, type_name: &str, data: &[u8]) -> DecodeResult<Report> {
    Decoder::new(registry).decode(type_name, data)
}

/// State of one decode call.
struct Walk<'r, 'd> {
    registry: &'r TypeRegistry,
    cursor: Cursor<'d>,
    diagnostics: Diagnostics,
    /// Aggregates being decoded, outermost first.
    active: Vec<String>,
    overrun_reported: bool,
}

impl<'r, 'd> Walk<'r, 'd> {
    fn aggregate(&mut self, def: &'r AggregateDef, start: usize) -> DecodedAggregate {
        self.active.push(def.name.clone());
        self.cursor.seek(start);

        let mut fields = Vec::with_capacity(def.members.len());
        for member in &def.members {
            if def.kind == AggregateKind::Union {
                self.cursor.seek(start);
            }
            if member.padding {
                self.cursor.advance(member.byte_size);
                continue;
            }

            let offset = self.cursor.offset();
            let value = if member.is_array() {
                self.array(member, offset)
            } else {
                self.element(member, offset)
            };
            self.cursor.seek(offset.saturating_add(member.byte_size));

            fields.push(DecodedField {
                name: member.var_name.clone(),
                offset,
                value,
            });
        }

        self.cursor.seek(start.saturating_add(def.size));
        self.active.pop();

        DecodedAggregate {
            kind: def.kind,
            type_name: def.name.clone(),
            anonymous: def.is_anonymous(),
            offset: start,
            size: def.size,
            fields,
        }
    }

    fn array(&mut self, member: &FieldDecl, offset: usize) -> FieldValue {
        let size = member.element_size();
        if size == 0 {
            self.diagnostics.error(
                DiagnosticKind::SizeMismatch,
                format!("array {} has zero-sized elements", member.var_name),
                None,
            );
            return FieldValue::Array(Vec::new());
        }

        let mut items = Vec::new();
        for i in 0..member.array_len {
            let at = offset.saturating_add(i.saturating_mul(size));
            if i > 0 && at >= self.cursor.len() {
                self.report_overrun(at, &member.var_name);
                break;
            }
            items.push(self.element(member, at));
        }
        FieldValue::Array(items)
    }

    /// Decode one element of `member` at `at`.
    fn element(&mut self, member: &FieldDecl, at: usize) -> FieldValue {
        self.cursor.seek(at);

        if member.is_pointer {
            let value = self.scalar(&member.type_name, WORD_SIZE, None, &member.var_name);
            return FieldValue::Scalar(value);
        }

        match self.registry.resolve(&member.type_name) {
            TypeRef::Struct(def) | TypeRef::Union(def) => {
                if self.active.iter().any(|name| *name == def.name) {
                    self.diagnostics.error(
                        DiagnosticKind::UnresolvedType,
                        format!("{} {} contains itself", def.kind, def.name),
                        None,
                    );
                    return FieldValue::Unresolved {
                        type_name: member.type_name.clone(),
                    };
                }
                FieldValue::Aggregate(self.aggregate(def, at))
            }
            TypeRef::Enum(def) => FieldValue::Scalar(self.scalar(
                &member.type_name,
                member.element_size(),
                Some(def),
                &member.var_name,
            )),
            TypeRef::Scalar { name, size } => {
                let width = if name == "char" { 1 } else { size };
                FieldValue::Scalar(self.scalar(name, width, None, &member.var_name))
            }
            TypeRef::Unresolved => {
                self.diagnostics.error(
                    DiagnosticKind::UnresolvedType,
                    format!(
                        "member {} has unresolved type {}",
                        member.var_name, member.type_name
                    ),
                    None,
                );
                FieldValue::Unresolved {
                    type_name: member.type_name.clone(),
                }
            }
        }
    }

    fn scalar(
        &mut self,
        type_name: &str,
        width: usize,
        labels: Option<&EnumDef>,
        field: &str,
    ) -> ScalarValue {
        let (raw, complete) = self.cursor.peek_le(width);
        if !complete {
            self.report_overrun(self.cursor.offset(), field);
        }

        let mut value = ScalarValue::new(type_name, width.min(8), raw);
        value.truncated = !complete;

        if let Some(def) = labels {
            let label = def
                .label_of(raw as i64)
                .or_else(|| def.label_of(value.signed()))
                .unwrap_or(UNKNOWN_LABEL);
            value.label = Some(label.to_string());
        } else if type_name == "char" && width == 1 && raw != 0 {
            value.character = char::from_u32(raw as u32).filter(|c| c.is_ascii_graphic() || *c == ' ');
        }

        value
    }

    fn report_overrun(&mut self, offset: usize, field: &str) {
        if self.overrun_reported {
            return;
        }
        self.overrun_reported = true;
        self.diagnostics.error(
            DiagnosticKind::BufferOverrun,
            format!(
                "field {} at offset {} reads past the end of the {}-byte buffer",
                field,
                offset,
                self.cursor.len()
            ),
            None,
        );
    }
}
