//! Struct and union layout for the 32-bit target.
//!
//! Struct members are laid out in a single forward pass. Members whose size
//! is a multiple of [`ALIGNMENT`] are placed directly; smaller members
//! accumulate into a pending run that is closed once it reaches the
//! alignment unit, with synthetic padding fields inserted where the target
//! compiler leaves gaps:
//!
//! | run | next member | result |
//! |-----|-------------|--------|
//! | 0   | 1, 2, 3     | run starts |
//! | r   | s, r+s = 4  | run closes, no padding |
//! | 1   | 1           | run grows to 2 |
//! | 1   | 2           | 1 byte padding before the member, run closes |
//! | 2   | 1           | 1 byte padding after the member, run closes |
//! | r   | aligned     | padding to the next boundary, run closes |
//!
//! A run still open after the last member is counted at its raw size, so a
//! struct may end mid-alignment.

use crate::error::LayoutError;
use crate::types::{AggregateKind, FieldDecl, ALIGNMENT};

/// Round `size` up to the alignment unit.
pub fn align_up(size: usize) -> usize {
    size.div_ceil(ALIGNMENT) * ALIGNMENT
}

/// Members with padding inserted, plus the final size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub members: Vec<FieldDecl>,
    pub size: usize,
}

/// Lay out an aggregate of the given kind.
pub fn compute(kind: AggregateKind, members: &[FieldDecl]) -> Result<Layout, LayoutError> {
    match kind {
        AggregateKind::Struct => layout_struct(members),
        AggregateKind::Union => Ok(Layout {
            members: members.to_vec(),
            size: union_size(members),
        }),
    }
}

/// Union size: the largest member, rounded up to the alignment unit.
pub fn union_size(members: &[FieldDecl]) -> usize {
    align_up(members.iter().map(|m| m.byte_size).max().unwrap_or(0))
}

/// Lay out a struct, inserting padding fields.
pub fn layout_struct(members: &[FieldDecl]) -> Result<Layout, LayoutError> {
    let mut out = Vec::with_capacity(members.len() + 2);
    let mut total = 0;
    let mut run = 0;

    for member in members {
        let size = member.byte_size;

        if size % ALIGNMENT == 0 {
            if run > 0 {
                let closed = align_up(run);
                if closed > run {
                    out.push(FieldDecl::padding(closed - run));
                }
                total += closed;
                run = 0;
            }
            out.push(member.clone());
            total += size;
            continue;
        }

        if size > ALIGNMENT {
            let field = member.var_name.clone();
            return Err(if member.is_array() {
                LayoutError::NarrowArray { field, size }
            } else {
                LayoutError::Alignment { field, size }
            });
        }

        match (run, size) {
            (0, _) => {
                out.push(member.clone());
                run = size;
            }
            (r, s) if (r + s) % ALIGNMENT == 0 => {
                out.push(member.clone());
                total += r + s;
                run = 0;
            }
            (1, 1) => {
                out.push(member.clone());
                run = 2;
            }
            (1, 2) => {
                out.push(FieldDecl::padding(1));
                out.push(member.clone());
                total += ALIGNMENT;
                run = 0;
            }
            (2, 1) => {
                out.push(member.clone());
                out.push(FieldDecl::padding(1));
                total += ALIGNMENT;
                run = 0;
            }
            _ => {
                return Err(LayoutError::BadRunSize {
                    field: member.var_name.clone(),
                    size,
                })
            }
        }
    }

    Ok(Layout {
        members: out,
        size: total + run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, size: usize) -> FieldDecl {
        FieldDecl::new("x", name, size)
    }

    fn array(name: &str, len: usize, size: usize) -> FieldDecl {
        let mut f = FieldDecl::new("char", name, size);
        f.array_len = len;
        f
    }

    fn shape(layout: &Layout) -> Vec<(String, usize)> {
        layout
            .members
            .iter()
            .map(|m| {
                let name = if m.padding { "<pad>" } else { m.var_name.as_str() };
                (name.to_string(), m.byte_size)
            })
            .collect()
    }

    fn names(shape: &[(&str, usize)]) -> Vec<(String, usize)> {
        shape.iter().map(|(n, s)| (n.to_string(), *s)).collect()
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 4);
        assert_eq!(align_up(4), 4);
        assert_eq!(align_up(13), 16);
    }

    #[test]
    fn test_char_then_int() {
        let layout = layout_struct(&[field("a", 1), field("level", 4)]).unwrap();
        assert_eq!(shape(&layout), names(&[("a", 1), ("<pad>", 3), ("level", 4)]));
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn test_chars_and_short_close_run() {
        let layout =
            layout_struct(&[field("a", 1), field("b", 1), field("c", 2), field("d", 4)]).unwrap();
        assert_eq!(
            shape(&layout),
            names(&[("a", 1), ("b", 1), ("c", 2), ("d", 4)])
        );
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn test_char_then_short_pads_before() {
        let layout = layout_struct(&[field("a", 1), field("s", 2)]).unwrap();
        assert_eq!(shape(&layout), names(&[("a", 1), ("<pad>", 1), ("s", 2)]));
        assert_eq!(layout.size, 4);
    }

    #[test]
    fn test_short_then_char_pads_after() {
        let layout = layout_struct(&[field("s", 2), field("a", 1), field("i", 4)]).unwrap();
        assert_eq!(
            shape(&layout),
            names(&[("s", 2), ("a", 1), ("<pad>", 1), ("i", 4)])
        );
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn test_trailing_run_not_rounded() {
        let layout = layout_struct(&[field("i", 4), field("c", 1)]).unwrap();
        assert_eq!(layout.size, 5);
        assert_eq!(layout.members.len(), 2);
    }

    #[test]
    fn test_aligned_array() {
        let layout = layout_struct(&[array("name", 16, 16), field("age", 4)]).unwrap();
        assert_eq!(layout.size, 20);
        assert!(layout.members.iter().all(|m| !m.padding));
    }

    #[test]
    fn test_short_array_run() {
        let layout = layout_struct(&[array("tag", 3, 3), field("i", 4)]).unwrap();
        assert_eq!(shape(&layout), names(&[("tag", 3), ("<pad>", 1), ("i", 4)]));
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn test_narrow_array_error() {
        let err = layout_struct(&[array("buf", 5, 5)]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::NarrowArray {
                field: "buf".to_string(),
                size: 5
            }
        );
    }

    #[test]
    fn test_alignment_error() {
        let err = layout_struct(&[field("odd", 6)]).unwrap_err();
        assert!(matches!(err, LayoutError::Alignment { size: 6, .. }));
    }

    #[test]
    fn test_bad_run() {
        let err = layout_struct(&[field("a", 2), field("b", 3)]).unwrap_err();
        assert!(matches!(err, LayoutError::BadRunSize { size: 3, .. }));
    }

    #[test]
    fn test_union_size() {
        assert_eq!(union_size(&[field("a", 1), field("b", 2)]), 4);
        assert_eq!(union_size(&[field("a", 8), field("b", 4)]), 8);
        assert_eq!(union_size(&[field("a", 5)]), 8);
        assert_eq!(union_size(&[]), 0);

        let layout = compute(AggregateKind::Union, &[field("a", 1)]).unwrap();
        assert_eq!(layout.size, 4);
        assert_eq!(layout.members.len(), 1);
    }

    #[test]
    fn test_empty_struct() {
        let layout = compute(AggregateKind::Struct, &[]).unwrap();
        assert_eq!(layout.size, 0);
        assert!(layout.members.is_empty());
    }
}
