#![no_main]

use libfuzzer_sys::fuzz_target;
use memlens_decode::decode;
use memlens_types::{parse_header, TypeRegistry};
use std::sync::OnceLock;

const HEADER: &str = r#"
#define N 4
typedef enum kind { NONE, SMALL = 2, LARGE = -1 } kind;
union cell { int i; short s[2]; char c; };
typedef struct entry {
    char tag;
    short id;
    union cell data[N];
    kind k;
    struct entry *next;
    union { long long wide; struct { char a; char b; } pair; } extra;
} entry;
"#;

fn registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| match parse_header(HEADER) {
        Ok((registry, _)) => registry,
        Err(err) => panic!("fuzz header does not parse: {}", err),
    })
}

fuzz_target!(|data: &[u8]| {
    // Decoding any buffer should never panic
    for name in ["entry", "cell"] {
        if let Ok(report) = decode(registry(), name, data) {
            let _ = report.to_string();
            let _ = report.to_json();
        }
    }
});
