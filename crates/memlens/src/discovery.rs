//! Header discovery and registry construction.

use crate::HeaderArgs;
use anyhow::{bail, Result};
use memlens_types::{Diagnostics, FsHeaderSource, HeaderParser, TypeRegistry};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively find `*.h` files under `root`, sorted by path.
pub fn find_headers(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut headers: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches!(entry.path().extension(), Some(ext) if ext == "h"))
        .map(|entry| entry.into_path())
        .collect();
    headers.sort();
    headers
}

/// Parse every discovered header into one registry.
///
/// A header that fails to parse is reported and skipped; the types it
/// registered before the failure stay in the registry.
pub fn load_registry(args: &HeaderArgs) -> Result<(TypeRegistry, Diagnostics)> {
    for dir in &args.include {
        if !dir.is_dir() {
            bail!("Include directory not found: {}", dir.display());
        }
    }

    let mut files: Vec<PathBuf> = args.include.iter().flat_map(find_headers).collect();
    files.extend(args.headers.iter().cloned());
    if files.is_empty() {
        bail!("No header files found; pass -I <DIR> or -f <HEADER>");
    }

    let source = FsHeaderSource::new(args.include.iter().cloned());
    let mut parser = HeaderParser::new(source);
    let mut failed = 0;

    for file in &files {
        if let Err(err) = parser.parse_file(file) {
            tracing::warn!(file = %file.display(), "skipping header: {}", err);
            failed += 1;
        }
    }

    let (registry, diagnostics) = parser.finish();
    tracing::info!(
        files = files.len(),
        failed,
        problems = diagnostics.errors().count(),
        "loaded {}",
        registry.stats()
    );
    Ok((registry, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_headers_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("b.h"), "").unwrap();
        fs::write(dir.path().join("a.h"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("source.c"), "").unwrap();
        fs::write(dir.path().join("sub/deeper/c.h"), "").unwrap();

        let found = find_headers(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.h"),
                PathBuf::from("b.h"),
                PathBuf::from("sub/deeper/c.h"),
            ]
        );
    }

    #[test]
    fn test_load_registry_skips_broken_header() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.h"), "struct broken { int a;").unwrap();
        fs::write(dir.path().join("b.h"), "struct ok { int a; };").unwrap();

        let args = HeaderArgs {
            include: vec![dir.path().to_path_buf()],
            headers: Vec::new(),
        };
        let (registry, diagnostics) = load_registry(&args).unwrap();
        assert_eq!(registry.size_of("ok"), Some(4));
        assert!(registry.get_struct("broken").is_none());
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_load_registry_requires_headers() {
        let dir = tempfile::tempdir().unwrap();
        let args = HeaderArgs {
            include: vec![dir.path().to_path_buf()],
            headers: Vec::new(),
        };
        assert!(load_registry(&args).is_err());

        let args = HeaderArgs {
            include: vec![dir.path().join("missing")],
            headers: Vec::new(),
        };
        assert!(load_registry(&args).is_err());
    }
}
