#![no_main]

use libfuzzer_sys::fuzz_target;
use memlens_types::parse_header;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Parsing arbitrary text should never panic
    if let Ok((registry, diagnostics)) = parse_header(&text) {
        for d in &diagnostics {
            let _ = d.to_string();
        }

        // Every registered aggregate must format and keep a consistent size
        for name in registry.struct_names().chain(registry.union_names()) {
            let _ = registry.format_type(name);
            if let Some(def) = registry.get_aggregate(name) {
                let covered: usize = def.members.iter().map(|m| m.byte_size).sum();
                if def.kind == memlens_types::AggregateKind::Struct && def.size > 0 {
                    assert_eq!(covered, def.size, "struct {} members do not cover its size", name);
                }
            }
        }

        let _ = registry.dump();
        let _ = registry.to_json();
    }
});
