//! Movement behaviour presets.

/// The absolute maximum number of cells any pedestrian may cover in one tick
/// (~6.5 km/h at 0.5 m cells and 1 s ticks).  The move phase runs this many
/// sub-steps.
pub const V_MAX: u8 = 6;

/// Movement parameters of a class of pedestrians.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementProfile {
    Dynamic,
    #[default]
    Average,
    Pensioner,
}

impl MovementProfile {
    pub const ALL: [MovementProfile; 3] = [
        MovementProfile::Dynamic,
        MovementProfile::Average,
        MovementProfile::Pensioner,
    ];

    /// Speed budget granted at the start of every tick (1..=`V_MAX`).
    #[inline]
    pub fn v_max(self) -> u8 {
        match self {
            MovementProfile::Dynamic   => 6,
            MovementProfile::Average   => 4,
            MovementProfile::Pensioner => 2,
        }
    }

    /// Probability of accepting a head-on place swap with another pedestrian.
    #[inline]
    pub fn agility(self) -> f64 {
        match self {
            MovementProfile::Dynamic   => 0.9,
            MovementProfile::Average   => 0.5,
            MovementProfile::Pensioner => 0.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementProfile::Dynamic   => "dynamic",
            MovementProfile::Average   => "average",
            MovementProfile::Pensioner => "pensioner",
        }
    }
}

impl std::fmt::Display for MovementProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
