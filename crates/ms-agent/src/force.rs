//! Relative force template each pedestrian projects onto the potential field.
//!
//! The template is stored facing north (`y = -1` is directly ahead) and is
//! rotated by the agent's facing before being applied.  Every value is
//! negative: the field is a pure superposition of repulsions, so a positive
//! cell value can only come from an unbalanced add/remove.

use ms_core::{Dir4, Offset};

/// One `(offset, force)` pair of the template.
pub type ForceEntry = (Offset, i32);

/// Strongest directly ahead, weaker to the sides and behind.  The agent's
/// own cell carries no force.
pub const FORCE_TEMPLATE: [ForceEntry; 20] = [
    // behind
    (Offset::new(-1, 1), -2),
    (Offset::new(0, 1), -3),
    (Offset::new(1, 1), -2),
    // beside
    (Offset::new(-2, 0), -2),
    (Offset::new(-1, 0), -4),
    (Offset::new(1, 0), -4),
    (Offset::new(2, 0), -2),
    // one ahead
    (Offset::new(-2, -1), -2),
    (Offset::new(-1, -1), -4),
    (Offset::new(0, -1), -5),
    (Offset::new(1, -1), -4),
    (Offset::new(2, -1), -2),
    // two ahead
    (Offset::new(-2, -2), -1),
    (Offset::new(-1, -2), -3),
    (Offset::new(0, -2), -4),
    (Offset::new(1, -2), -3),
    (Offset::new(2, -2), -1),
    // three ahead
    (Offset::new(-1, -3), -1),
    (Offset::new(0, -3), -2),
    (Offset::new(1, -3), -1),
];

/// Iterate the template rotated to face `dir`.
pub fn rotated_template(dir: Dir4) -> impl Iterator<Item = ForceEntry> {
    let turns = dir.quarter_turns();
    FORCE_TEMPLATE
        .iter()
        .map(move |&(offset, force)| (offset.rotate(turns), force))
}

/// Force the template contributes at `offset` from an agent facing `dir`.
pub fn force_at(dir: Dir4, offset: Offset) -> i32 {
    rotated_template(dir)
        .find(|(o, _)| *o == offset)
        .map(|(_, f)| f)
        .unwrap_or(0)
}
