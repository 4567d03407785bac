use std::fmt;

/// Locally dominant walking direction around a cell, as classified by the
/// lane analyser.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaneDirection {
    East,
    West,
    /// Agents present but no dominant direction.
    None,
    /// No agents in the assessment frame.
    #[default]
    Empty,
}

impl LaneDirection {
    /// `true` for `East` and `West`.
    #[inline]
    pub fn is_directional(self) -> bool {
        matches!(self, LaneDirection::East | LaneDirection::West)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LaneDirection::East  => "east",
            LaneDirection::West  => "west",
            LaneDirection::None  => "none",
            LaneDirection::Empty => "empty",
        }
    }
}

impl fmt::Display for LaneDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
