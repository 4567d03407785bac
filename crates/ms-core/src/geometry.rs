//! Grid coordinates, relative offsets, and the four facing directions.
//!
//! Screen convention: `x` grows eastward, `y` grows southward, so "north" is
//! `(0, -1)`.  All coordinates are signed so that offsets may leave the board;
//! callers check `Board::is_on_board` before indexing.

use std::fmt;

// ── GridPoint ─────────────────────────────────────────────────────────────────

/// An absolute cell coordinate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(self, other: GridPoint) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }

    /// Squared Euclidean distance (exact, integer).
    #[inline]
    pub fn distance_sq(self, other: GridPoint) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// City-block distance.
    #[inline]
    pub fn manhattan(self, other: GridPoint) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The cell one step away in direction `dir`.
    #[inline]
    pub fn step(self, dir: Dir4) -> GridPoint {
        self + dir.offset()
    }
}

impl std::ops::Add<Offset> for GridPoint {
    type Output = GridPoint;
    #[inline]
    fn add(self, rhs: Offset) -> GridPoint {
        GridPoint::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl std::ops::Sub for GridPoint {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: GridPoint) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Offset ────────────────────────────────────────────────────────────────────

/// A relative displacement between two cells.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Rotate by `quarter_turns * 90°` clockwise (on screen).
    ///
    /// One clockwise quarter turn maps north-facing `(0, -1)` to east-facing
    /// `(1, 0)`.
    #[inline]
    pub fn rotate(self, quarter_turns: u8) -> Offset {
        let mut v = self;
        for _ in 0..(quarter_turns % 4) {
            v = Offset::new(-v.dy, v.dx);
        }
        v
    }
}

// ── Dir4 ──────────────────────────────────────────────────────────────────────

/// One of the four facing directions of a pedestrian.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dir4 {
    #[default]
    N,
    E,
    S,
    W,
}

impl Dir4 {
    pub const ALL: [Dir4; 4] = [Dir4::N, Dir4::E, Dir4::S, Dir4::W];

    /// Unit step for this direction.
    #[inline]
    pub fn offset(self) -> Offset {
        match self {
            Dir4::N => Offset::new(0, -1),
            Dir4::E => Offset::new(1, 0),
            Dir4::S => Offset::new(0, 1),
            Dir4::W => Offset::new(-1, 0),
        }
    }

    /// Clockwise quarter turns from north.  Used to rotate force templates,
    /// which are stored facing north.
    #[inline]
    pub fn quarter_turns(self) -> u8 {
        match self {
            Dir4::N => 0,
            Dir4::E => 1,
            Dir4::S => 2,
            Dir4::W => 3,
        }
    }

    #[inline]
    pub fn opposite(self) -> Dir4 {
        match self {
            Dir4::N => Dir4::S,
            Dir4::E => Dir4::W,
            Dir4::S => Dir4::N,
            Dir4::W => Dir4::E,
        }
    }

    /// Signed horizontal component: `+1` east, `-1` west, `0` otherwise.
    #[inline]
    pub fn horizontal(self) -> i32 {
        self.offset().dx
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Dir4::N | Dir4::S)
    }

    /// Single-letter label for CSV output and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir4::N => "N",
            Dir4::E => "E",
            Dir4::S => "S",
            Dir4::W => "W",
        }
    }
}

impl fmt::Display for Dir4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
