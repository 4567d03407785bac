//! Per-row lane classification and coherence scoring.
//!
//! For every cell `(x, y)` a horizontal frame of `frame_width` cells is laid
//! over row `y`, starting `frame_width / 2` cells to the left of `x` and
//! clipped to the board.  Within it:
//!
//! * no agents → [`LaneDirection::Empty`];
//! * `density = agents / frame_width < 0.6` and `|mean heading| > 0.6`
//!   → [`LaneDirection::East`] or [`LaneDirection::West`] by sign;
//! * otherwise → [`LaneDirection::None`].
//!
//! Density always divides by the nominal width, so clipped frames at the
//! board edge read as sparser than they are.

use ms_grid::{Board, LaneDirection};

/// Frames at or above this fill ratio are too packed to count as a lane.
pub const DENSITY_LIMIT: f64 = 0.6;

/// Mean horizontal heading needed for a directional classification.
pub const DIRECTION_THRESHOLD: f64 = 0.6;

/// Result of one full-board pass.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneStats {
    /// Share of non-empty cells classified `East` or `West`, in percent.
    /// `100.0` when every cell is empty.
    pub lane_percentage: f64,
    /// Zero or negative; one point off per `E·W·E` / `W·E·W` column triple.
    pub coherence:       i64,
}

pub struct LaneAnalyzer {
    frame_width: usize,
}

impl LaneAnalyzer {
    pub fn new(frame_width: usize) -> Self {
        Self { frame_width: frame_width.max(1) }
    }

    #[inline]
    pub fn frame_width(&self) -> usize {
        self.frame_width
    }

    /// Classify the frame around column `x` of row `y`.
    pub fn classify_frame(&self, board: &Board, x: usize, y: usize) -> LaneDirection {
        let row = board.row(y);
        let start = x.saturating_sub(self.frame_width / 2);
        let end = (start + self.frame_width).min(row.len());

        let mut count = 0usize;
        let mut heading = 0i32;
        for agent in row[start..end].iter().filter_map(|c| c.occupant()) {
            count += 1;
            heading += agent.direction().horizontal();
        }
        if count == 0 {
            return LaneDirection::Empty;
        }

        let density = count as f64 / self.frame_width as f64;
        let mean = f64::from(heading) / count as f64;
        if density < DENSITY_LIMIT && mean.abs() > DIRECTION_THRESHOLD {
            if mean > 0.0 { LaneDirection::East } else { LaneDirection::West }
        } else {
            LaneDirection::None
        }
    }

    /// Classify every cell of row `y`.
    pub fn classify_row(&self, board: &Board, y: usize) -> Vec<LaneDirection> {
        (0..board.width()).map(|x| self.classify_frame(board, x, y)).collect()
    }

    /// Classify the whole board, one `Vec` per row.
    ///
    /// With the `parallel` feature, rows are classified on Rayon's pool.
    pub fn classify(&self, board: &Board) -> Vec<Vec<LaneDirection>> {
        #[cfg(not(feature = "parallel"))]
        {
            (0..board.height()).map(|y| self.classify_row(board, y)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            (0..board.height())
                .into_par_iter()
                .map(|y| self.classify_row(board, y))
                .collect()
        }
    }

    /// Classify, store the result on the board, and score it.
    pub fn assess(&self, board: &mut Board) -> LaneStats {
        let rows = self.classify(board);
        for (y, row) in rows.iter().enumerate() {
            board.set_row_lanes(y, row);
        }
        LaneStats {
            lane_percentage: lane_percentage(&rows),
            coherence:       coherence(&rows),
        }
    }
}

/// Percentage of non-empty cells that belong to a lane.
pub fn lane_percentage(rows: &[Vec<LaneDirection>]) -> f64 {
    let mut occupied = 0usize;
    let mut undirected = 0usize;
    for &lane in rows.iter().flatten() {
        match lane {
            LaneDirection::Empty => {}
            LaneDirection::None => {
                occupied += 1;
                undirected += 1;
            }
            LaneDirection::East | LaneDirection::West => occupied += 1,
        }
    }
    if occupied == 0 {
        return 100.0;
    }
    (occupied - undirected) as f64 / occupied as f64 * 100.0
}

/// Penalty for lanes that flip direction for a single row.
///
/// For every column and every three vertically adjacent rows whose first
/// two classifications are directional, the score drops by one when the
/// middle differs from the first and the third equals the first.
pub fn coherence(rows: &[Vec<LaneDirection>]) -> i64 {
    let mut score = 0i64;
    for triple in rows.windows(3) {
        let [top, mid, bottom] = triple else { continue };
        for ((&a, &b), &c) in top.iter().zip(mid).zip(bottom) {
            if a.is_directional() && b.is_directional() && a == c && a != b {
                score -= 1;
            }
        }
    }
    score
}
