//! Text rendering of decoded values.
//!
//! ```text
//! struct Employee {
//!     id =   7, 0x00000007
//!     person = struct Person {
//!         name = [
//!             [0] =  74, 0x4a, 'J'
//!             ...
//!         ]
//!         home =   9, 0x00000009, Beijing
//!     }
//! }
//! ```

use crate::value::{DecodedAggregate, FieldValue, ScalarValue};
use std::fmt;

const INDENT: usize = 4;

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}, {}", self.value, self.hex)?;
        if let Some(label) = &self.label {
            write!(f, ", {}", label)?;
        } else if let Some(c) = self.character {
            write!(f, ", '{}'", c)?;
        }
        Ok(())
    }
}

impl fmt::Display for DecodedAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_aggregate(f, self, 0)
    }
}

fn pad(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    write!(f, "{:width$}", "", width = depth * INDENT)
}

fn write_aggregate(f: &mut fmt::Formatter<'_>, agg: &DecodedAggregate, depth: usize) -> fmt::Result {
    if agg.anonymous {
        writeln!(f, "{} {{", agg.kind)?;
    } else {
        writeln!(f, "{} {} {{", agg.kind, agg.type_name)?;
    }

    for field in &agg.fields {
        pad(f, depth + 1)?;
        write!(f, "{} = ", field.name)?;
        write_value(f, &field.value, depth + 1)?;
    }

    pad(f, depth)?;
    writeln!(f, "}}")
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &FieldValue, depth: usize) -> fmt::Result {
    match value {
        FieldValue::Scalar(scalar) => writeln!(f, "{}", scalar),
        FieldValue::Aggregate(agg) => write_aggregate(f, agg, depth),
        FieldValue::Array(items) => {
            writeln!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                pad(f, depth + 1)?;
                write!(f, "[{}] = ", i)?;
                write_value(f, item, depth + 1)?;
            }
            pad(f, depth)?;
            writeln!(f, "]")
        }
        FieldValue::Unresolved { type_name } => writeln!(f, "<unresolved type {}>", type_name),
    }
}
