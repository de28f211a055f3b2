//! Decode a binary dump against the parsed headers.

use crate::discovery::load_registry;
use crate::HeaderArgs;
use anyhow::{Context, Result};
use memlens_decode::Decoder;
use std::path::Path;

/// Handle `memlens decode`.
pub fn handle_decode_command(
    type_name: &str,
    binary: &Path,
    headers: &HeaderArgs,
    json: bool,
) -> Result<()> {
    let (registry, _) = load_registry(headers)?;

    let report = Decoder::new(&registry)
        .decode_file(type_name, binary)
        .with_context(|| format!("Failed to decode {} as {}", binary.display(), type_name))?;

    if report.diagnostics.has_errors() {
        tracing::warn!(
            count = report.diagnostics.errors().count(),
            "decoded with problems; output may be incomplete"
        );
    }

    if json {
        let out = serde_json::to_string_pretty(&report.root)
            .context("Failed to serialize decoded tree")?;
        println!("{}", out);
    } else {
        print!("{}", report);
    }
    Ok(())
}
