//! Show the types extracted from headers.

use crate::discovery::load_registry;
use crate::HeaderArgs;
use anyhow::{bail, Context, Result};
use memlens_types::{TypeRef, TypeRegistry};

/// Handle `memlens types`.
pub fn handle_types_command(headers: &HeaderArgs, name: Option<&str>, json: bool) -> Result<()> {
    let (registry, _) = load_registry(headers)?;

    match name {
        Some(name) => show_type(&registry, name, json),
        None if json => {
            let out = registry.to_json().context("Failed to serialize types")?;
            println!("{}", out);
            Ok(())
        }
        None => {
            print!("{}", registry.dump());
            Ok(())
        }
    }
}

fn show_type(registry: &TypeRegistry, name: &str, json: bool) -> Result<()> {
    if !registry.is_known(name) {
        bail!("Type '{}' not found in the parsed headers", name);
    }

    if !json {
        println!("{}", registry.format_type(name));
        return Ok(());
    }

    let out = match registry.resolve(name) {
        TypeRef::Struct(def) | TypeRef::Union(def) => serde_json::to_string_pretty(def),
        TypeRef::Enum(def) => serde_json::to_string_pretty(def),
        TypeRef::Scalar { name, size } => {
            serde_json::to_string_pretty(&serde_json::json!({ "name": name, "size": size }))
        }
        TypeRef::Unresolved => bail!("Type '{}' does not resolve", name),
    }
    .context("Failed to serialize type")?;
    println!("{}", out);
    Ok(())
}
