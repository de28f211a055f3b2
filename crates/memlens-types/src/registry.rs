//! Type registry for storing and looking up extracted types.
//!
//! The registry holds struct, union and enum definitions, the size of every
//! known type, integer constants and typedef aliases. It is filled by the
//! header parser and read by everything else: mutation is crate-private, so
//! once a [`TypeRegistry`] leaves the parser it is a read-only schema.

use crate::error::{ParseError, ParseResult};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar type names and their sizes on the 32-bit target.
pub const SCALAR_TYPES: &[(&str, usize)] = &[
    ("void", 0),
    ("char", 1),
    ("bool", 1),
    ("__WCHAR_T_TYPE__", 1),
    ("short", 2),
    ("int", 4),
    ("long", 4),
    ("float", 4),
    ("size_t", 4),
    ("ssize_t", 4),
    ("__SIZE_T_TYPE__", 4),
    ("__PTRDIFF_T_TYPE__", 4),
    ("double", 8),
    ("long long", 8),
    ("__int64", 8),
    ("int8_t", 1),
    ("uint8_t", 1),
    ("int16_t", 2),
    ("uint16_t", 2),
    ("int32_t", 4),
    ("uint32_t", 4),
    ("intptr_t", 4),
    ("uintptr_t", 4),
    ("int64_t", 8),
    ("uint64_t", 8),
];

/// Size of a scalar type name.
pub fn scalar_size(name: &str) -> Option<usize> {
    SCALAR_TYPES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, size)| *size)
}

pub fn is_scalar(name: &str) -> bool {
    scalar_size(name).is_some()
}

/// Kind of a registered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Scalar,
    Struct,
    Union,
    Enum,
    Alias,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::Alias => "typedef",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The schema store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRegistry {
    structs: BTreeMap<String, AggregateDef>,
    unions: BTreeMap<String, AggregateDef>,
    enums: BTreeMap<String, EnumDef>,

    /// Size of every known type, scalars included.
    sizes: BTreeMap<String, usize>,

    /// Integer constants from `#define`, global assignments and enum labels.
    constants: BTreeMap<String, i64>,

    /// Typedef alias to canonical type name.
    aliases: BTreeMap<String, String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding only the scalar types.
    pub fn new() -> Self {
        Self {
            structs: BTreeMap::new(),
            unions: BTreeMap::new(),
            enums: BTreeMap::new(),
            sizes: SCALAR_TYPES
                .iter()
                .map(|(name, size)| (name.to_string(), *size))
                .collect(),
            constants: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    // ==================== Registration ====================

    /// Kind of `name` without following aliases.
    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        if is_scalar(name) {
            Some(TypeKind::Scalar)
        } else if self.structs.contains_key(name) {
            Some(TypeKind::Struct)
        } else if self.unions.contains_key(name) {
            Some(TypeKind::Union)
        } else if self.enums.contains_key(name) {
            Some(TypeKind::Enum)
        } else if self.aliases.contains_key(name) {
            Some(TypeKind::Alias)
        } else {
            None
        }
    }

    fn check_free(&self, name: &str, kind: TypeKind) -> ParseResult<()> {
        match self.kind_of(name) {
            Some(existing) if existing != kind => Err(ParseError::DuplicateType {
                name: name.to_string(),
                existing: existing.as_str(),
            }),
            _ => Ok(()),
        }
    }

    /// Register a struct or union. Returns the replaced definition when the
    /// name was already registered as the same kind.
    pub(crate) fn insert_aggregate(
        &mut self,
        def: AggregateDef,
    ) -> ParseResult<Option<AggregateDef>> {
        let kind = match def.kind {
            AggregateKind::Struct => TypeKind::Struct,
            AggregateKind::Union => TypeKind::Union,
        };
        self.check_free(&def.name, kind)?;

        self.sizes.insert(def.name.clone(), def.size);
        let map = match def.kind {
            AggregateKind::Struct => &mut self.structs,
            AggregateKind::Union => &mut self.unions,
        };
        Ok(map.insert(def.name.clone(), def))
    }

    /// Register an enum. Returns the replaced definition, if any.
    pub(crate) fn insert_enum(&mut self, def: EnumDef) -> ParseResult<Option<EnumDef>> {
        self.check_free(&def.name, TypeKind::Enum)?;
        self.sizes.insert(def.name.clone(), ENUM_SIZE);
        Ok(self.enums.insert(def.name.clone(), def))
    }

    /// Record a constant. Returns the previous value, if any.
    pub(crate) fn insert_constant(&mut self, name: impl Into<String>, value: i64) -> Option<i64> {
        self.constants.insert(name.into(), value)
    }

    /// Register `alias` as another name for `target`.
    ///
    /// The target is stored in canonical form. Aliasing a name to itself is
    /// a no-op.
    pub(crate) fn insert_alias(&mut self, alias: &str, target: &str) -> ParseResult<()> {
        let target = self.canonical(target).to_string();
        if alias == target {
            return Ok(());
        }
        if !self.resolve(&target).is_resolved() {
            return Err(ParseError::UnknownType(target));
        }
        self.check_free(alias, TypeKind::Alias)?;
        self.aliases.insert(alias.to_string(), target);
        Ok(())
    }

    // ==================== Lookup ====================

    /// Follow typedef aliases to the canonical name.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Resolve a type name.
    pub fn resolve(&self, name: &str) -> TypeRef<'_> {
        let name = self.canonical(name);
        if let Some((scalar, size)) = SCALAR_TYPES.iter().find(|(n, _)| *n == name) {
            return TypeRef::Scalar {
                name: *scalar,
                size: *size,
            };
        }
        if let Some(def) = self.structs.get(name) {
            return TypeRef::Struct(def);
        }
        if let Some(def) = self.unions.get(name) {
            return TypeRef::Union(def);
        }
        if let Some(def) = self.enums.get(name) {
            return TypeRef::Enum(def);
        }
        TypeRef::Unresolved
    }

    /// Check whether `name` names any known type.
    pub fn is_known(&self, name: &str) -> bool {
        self.resolve(name).is_resolved()
    }

    /// Members of a struct or union in layout order, padding included.
    pub fn fields_of(&self, name: &str) -> Option<&[FieldDecl]> {
        self.get_aggregate(name).map(|def| def.members.as_slice())
    }

    /// Label/value pairs of an enum.
    pub fn enum_labels(&self, name: &str) -> Option<&[(String, i64)]> {
        self.get_enum(name).map(|def| def.labels.as_slice())
    }

    /// Size in bytes of any known type.
    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.sizes.get(self.canonical(name)).copied()
    }

    pub fn constant(&self, name: &str) -> Option<i64> {
        self.constants.get(name).copied()
    }

    pub fn get_struct(&self, name: &str) -> Option<&AggregateDef> {
        self.structs.get(self.canonical(name))
    }

    pub fn get_union(&self, name: &str) -> Option<&AggregateDef> {
        self.unions.get(self.canonical(name))
    }

    /// Struct or union definition.
    pub fn get_aggregate(&self, name: &str) -> Option<&AggregateDef> {
        self.get_struct(name).or_else(|| self.get_union(name))
    }

    pub fn get_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(self.canonical(name))
    }

    pub fn is_anonymous(&self, name: &str) -> bool {
        is_anonymous_name(self.canonical(name))
    }

    /// Field covering byte `offset` of a struct, padding excluded.
    pub fn field_at_offset(&self, type_name: &str, offset: usize) -> Option<&FieldDecl> {
        let def = self.get_aggregate(type_name)?;
        def.member_offsets()
            .into_iter()
            .find(|(start, m)| !m.padding && offset >= *start && offset < start + m.byte_size)
            .map(|(_, m)| m)
    }

    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    pub fn union_names(&self) -> impl Iterator<Item = &str> {
        self.unions.keys().map(String::as_str)
    }

    pub fn enum_names(&self) -> impl Iterator<Item = &str> {
        self.enums.keys().map(String::as_str)
    }

    /// Constants in name order.
    pub fn constants(&self) -> impl Iterator<Item = (&str, i64)> {
        self.constants.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Aliases and their canonical targets in name order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    // ==================== Formatting ====================

    /// Render a C-like definition of `name` with offsets and sizes.
    pub fn format_type(&self, name: &str) -> String {
        if let Some(target) = self.aliases.get(name) {
            return format!("typedef {} {};", target, name);
        }

        match self.resolve(name) {
            TypeRef::Struct(def) | TypeRef::Union(def) => {
                let mut result = format!("{} {} {{\n", def.kind, def.name);
                for (offset, member) in def.member_offsets() {
                    result.push_str(&format!(
                        "    {}; // offset {}, size {}\n",
                        member.to_c_string(),
                        offset,
                        member.byte_size
                    ));
                }
                result.push('}');
                result.push_str(&format!(" // size: {} bytes", def.size));
                result
            }
            TypeRef::Enum(def) => {
                let mut result = format!("enum {} {{\n", def.name);
                for (label, value) in &def.labels {
                    result.push_str(&format!("    {} = {},\n", label, value));
                }
                result.push('}');
                result.push_str(&format!(" // size: {} bytes", ENUM_SIZE));
                result
            }
            TypeRef::Scalar { name, size } => format!("{} // size: {} bytes", name, size),
            TypeRef::Unresolved => format!("// Unknown type: {}", name),
        }
    }

    /// Render every constant, struct, union, enum and alias.
    pub fn dump(&self) -> String {
        let mut sections = Vec::new();

        if !self.constants.is_empty() {
            let defines: Vec<_> = self
                .constants
                .iter()
                .map(|(name, value)| format!("#define {} {}", name, value))
                .collect();
            sections.push(defines.join("\n"));
        }

        let names = self
            .struct_names()
            .chain(self.union_names())
            .chain(self.enum_names());
        for name in names {
            sections.push(self.format_type(name));
        }

        if !self.aliases.is_empty() {
            let typedefs: Vec<_> = self.aliases.keys().map(|a| self.format_type(a)).collect();
            sections.push(typedefs.join("\n"));
        }

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    // ==================== Serialization ====================

    /// Save registry to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load registry from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // ==================== Statistics ====================

    /// Get registry statistics.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            struct_count: self.structs.len(),
            union_count: self.unions.len(),
            enum_count: self.enums.len(),
            constant_count: self.constants.len(),
            alias_count: self.aliases.len(),
        }
    }
}

/// Statistics about a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub struct_count: usize,
    pub union_count: usize,
    pub enum_count: usize,
    pub constant_count: usize,
    pub alias_count: usize,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} structs, {} unions, {} enums, {} constants, {} typedefs",
            self.struct_count,
            self.union_count,
            self.enum_count,
            self.constant_count,
            self.alias_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> AggregateDef {
        AggregateDef {
            name: "point".to_string(),
            kind: AggregateKind::Struct,
            members: vec![FieldDecl::new("int", "x", 4), FieldDecl::new("int", "y", 4)],
            size: 8,
        }
    }

    fn home() -> EnumDef {
        let mut e = EnumDef::new("Home");
        e.add_label("Anhui", 1);
        e.add_label("Beijing", 9);
        e
    }

    #[test]
    fn test_scalars_prepopulated() {
        let reg = TypeRegistry::new();
        assert_eq!(reg.size_of("char"), Some(1));
        assert_eq!(reg.size_of("short"), Some(2));
        assert_eq!(reg.size_of("long long"), Some(8));
        assert_eq!(reg.size_of("void"), Some(0));
        assert_eq!(reg.kind_of("int"), Some(TypeKind::Scalar));
        assert!(matches!(reg.resolve("int"), TypeRef::Scalar { size: 4, .. }));
        assert_eq!(reg.resolve("nothing"), TypeRef::Unresolved);
    }

    #[test]
    fn test_add_and_get_aggregate() {
        let mut reg = TypeRegistry::new();
        assert!(reg.insert_aggregate(point()).unwrap().is_none());

        assert!(reg.is_known("point"));
        assert_eq!(reg.size_of("point"), Some(8));
        assert_eq!(reg.fields_of("point").unwrap().len(), 2);
        assert!(matches!(reg.resolve("point"), TypeRef::Struct(_)));
        assert!(reg.get_union("point").is_none());
        assert_eq!(reg.struct_names().collect::<Vec<_>>(), vec!["point"]);
    }

    #[test]
    fn test_same_kind_redefinition_replaces() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(point()).unwrap();

        let mut bigger = point();
        bigger.members.push(FieldDecl::new("int", "z", 4));
        bigger.size = 12;
        let old = reg.insert_aggregate(bigger).unwrap();

        assert_eq!(old.unwrap().size, 8);
        assert_eq!(reg.size_of("point"), Some(12));
    }

    #[test]
    fn test_cross_kind_conflict_rejected() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(point()).unwrap();

        let mut as_union = point();
        as_union.kind = AggregateKind::Union;
        let err = reg.insert_aggregate(as_union).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DuplicateType {
                existing: "struct",
                ..
            }
        ));
        assert!(reg.get_union("point").is_none());

        let err = reg.insert_enum(EnumDef::new("int")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DuplicateType {
                existing: "scalar",
                ..
            }
        ));
        assert_eq!(reg.size_of("int"), Some(4));
    }

    #[test]
    fn test_enum() {
        let mut reg = TypeRegistry::new();
        reg.insert_enum(home()).unwrap();
        assert_eq!(reg.size_of("Home"), Some(ENUM_SIZE));
        assert_eq!(reg.enum_labels("Home").unwrap().len(), 2);
        assert!(matches!(reg.resolve("Home"), TypeRef::Enum(_)));
    }

    #[test]
    fn test_alias() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(point()).unwrap();
        reg.insert_alias("point_t", "point").unwrap();
        reg.insert_alias("pt", "point_t").unwrap();

        assert_eq!(reg.canonical("pt"), "point");
        assert_eq!(reg.size_of("pt"), Some(8));
        assert!(matches!(reg.resolve("pt"), TypeRef::Struct(_)));
        assert_eq!(reg.kind_of("pt"), Some(TypeKind::Alias));

        reg.insert_alias("point", "point").unwrap();
        assert!(reg.insert_alias("int", "point").is_err());
        assert!(matches!(
            reg.insert_alias("x", "missing"),
            Err(ParseError::UnknownType(_))
        ));
    }

    #[test]
    fn test_constants() {
        let mut reg = TypeRegistry::new();
        assert_eq!(reg.insert_constant("MAX", 16), None);
        assert_eq!(reg.insert_constant("MAX", 32), Some(16));
        assert_eq!(reg.constant("MAX"), Some(32));
        assert_eq!(reg.constants().collect::<Vec<_>>(), vec![("MAX", 32)]);
    }

    #[test]
    fn test_field_at_offset() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(point()).unwrap();
        assert_eq!(reg.field_at_offset("point", 0).unwrap().var_name, "x");
        assert_eq!(reg.field_at_offset("point", 6).unwrap().var_name, "y");
        assert!(reg.field_at_offset("point", 8).is_none());
    }

    #[test]
    fn test_format_type() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(AggregateDef {
            name: "Manager".to_string(),
            kind: AggregateKind::Struct,
            members: vec![
                FieldDecl::new("char", "a", 1),
                FieldDecl::padding(3),
                FieldDecl::new("int", "level", 4),
            ],
            size: 8,
        })
        .unwrap();

        let text = reg.format_type("Manager");
        assert!(text.starts_with("struct Manager {\n"));
        assert!(text.contains("    char a; // offset 0, size 1\n"));
        assert!(text.contains("    char <padding>[3]; // offset 1, size 3\n"));
        assert!(text.contains("    int level; // offset 4, size 4\n"));
        assert!(text.ends_with("} // size: 8 bytes"));

        reg.insert_enum(home()).unwrap();
        assert!(reg.format_type("Home").contains("    Beijing = 9,\n"));
        assert_eq!(reg.format_type("nope"), "// Unknown type: nope");
    }

    #[test]
    fn test_dump_and_stats() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(point()).unwrap();
        reg.insert_enum(home()).unwrap();
        reg.insert_constant("MAX_NAME_LENGTH", 16);
        reg.insert_alias("point_t", "point").unwrap();

        let dump = reg.dump();
        assert!(dump.starts_with("#define MAX_NAME_LENGTH 16\n\nstruct point {"));
        assert!(dump.contains("enum Home {"));
        assert!(dump.contains("typedef point point_t;"));

        let stats = reg.stats();
        assert_eq!(stats.struct_count, 1);
        assert_eq!(stats.enum_count, 1);
        assert_eq!(stats.alias_count, 1);
        assert_eq!(
            stats.to_string(),
            "1 structs, 0 unions, 1 enums, 1 constants, 1 typedefs"
        );
    }

    #[test]
    fn test_json() {
        let mut reg = TypeRegistry::new();
        reg.insert_aggregate(point()).unwrap();
        let json = reg.to_json().unwrap();
        assert!(json.contains("\"point\""));

        let back = TypeRegistry::from_json(&json).unwrap();
        assert_eq!(back.size_of("point"), Some(8));
    }
}
