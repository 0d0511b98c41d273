//! Result Assembler (spec.md §4.H).
//!
//! The final pipeline stage: takes the `PathNote`s produced by running the
//! SMT Driver (§4.G) over every enumerated Path (§4.D) and removes duplicate
//! notes while preserving first-seen order. Two notes are duplicates when
//! they carry the same `(start_line, end_line, reachable)` triple —
//! `explanation` is not part of the key — which happens whenever two
//! distinct Paths pass through the same Conditional context with the same
//! outcome.

use std::collections::HashSet;

use crate::smt::PathNote;

/// De-duplicates `notes` by `(start_line, end_line, reachable)`, keeping the
/// first occurrence of each distinct triple and dropping the rest.
pub fn assemble(notes: Vec<PathNote>) -> Vec<PathNote> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(notes.len());
    for note in notes {
        let key = (note.start_line, note.end_line, note.reachable);
        if seen.insert(key) {
            result.push(note);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_duplicate_range_and_reachable_keeping_first_order() {
        let notes = vec![
            PathNote {
                start_line: 2,
                end_line: 4,
                reachable: false,
                explanation: None,
            },
            PathNote {
                start_line: 6,
                end_line: 6,
                reachable: true,
                explanation: Some("solver returned unknown".to_string()),
            },
            PathNote {
                start_line: 2,
                end_line: 4,
                reachable: false,
                explanation: None,
            },
        ];
        let assembled = assemble(notes);
        assert_eq!(assembled.len(), 2);
        assert_eq!(assembled[0].start_line, 2);
        assert!(!assembled[0].reachable);
        assert_eq!(assembled[1].start_line, 6);
        assert!(assembled[1].reachable);
    }
}
