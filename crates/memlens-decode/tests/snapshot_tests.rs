//! Snapshot tests for the decoder's text output.
//!
//! To update snapshots when making intentional changes, run:
//! ```bash
//! cargo insta review
//! ```

use memlens_decode::decode;
use memlens_types::parse_header;

const EMPLOYEE: &str = include_str!("../../../tests/fixtures/Employee.h");

#[test]
fn snapshot_employee_text() {
    let (registry, _) = parse_header(EMPLOYEE).unwrap();

    let mut data = vec![0u8; 36];
    data[0] = 7;
    data[4..9].copy_from_slice(b"Alice");
    data[20] = 30;
    data[24] = 9;
    data[28] = b'M';
    data[32] = 3;

    let report = decode(&registry, "Employee", &data).unwrap();
    insta::assert_snapshot!("employee_text", report.to_string());
}

#[test]
fn snapshot_unknown_enum_text() {
    let (registry, _) = parse_header(
        "enum color { RED, GREEN };\nstruct pixel { enum color c; short x; short y; };",
    )
    .unwrap();

    let report = decode(&registry, "pixel", &[7, 0, 0, 0, 0xff, 0xff, 2, 0]).unwrap();
    insta::assert_snapshot!("unknown_enum_text", report.to_string());
}
