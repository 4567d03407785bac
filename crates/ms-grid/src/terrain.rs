//! Static venue layout: tiles, features, and derived point lists.
//!
//! A [`Terrain`] never changes after [`TerrainBuilder::build`].  The board
//! and every planner worker share one instance through `Arc<Terrain>`, so
//! planning always reads a consistent snapshot while the scheduler mutates
//! occupancy on its own thread.
//!
//! Storage is row-major: the tile at `(x, y)` lives at index
//! `y * width + x`.

use std::sync::Arc;

use tracing::debug;

use ms_core::{GridPoint, MsError, MsResult};

use crate::Feature;

// ── Tile ──────────────────────────────────────────────────────────────────────

/// Terrain class of a single cell.  Decides passability and which movement
/// algorithm drives agents standing on it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    Wall,
    /// Four-neighbour stepping with head-on swaps.
    #[default]
    Ped4,
    /// Neighbour choice weighted by the live potential field.
    SocialForce,
}

impl TileKind {
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tile {
    pub kind:    TileKind,
    pub feature: Option<Arc<Feature>>,
}

impl Tile {
    /// The one blocked tile.  Walls never carry a feature.
    pub const WALL: Tile = Tile { kind: TileKind::Wall, feature: None };

    pub fn floor(kind: TileKind) -> Self {
        Self { kind, feature: None }
    }

    #[inline]
    pub fn is_passable(&self) -> bool {
        self.kind.is_passable()
    }

    /// Run a heuristic score through this tile's feature, if any.
    #[inline]
    pub fn modify_heuristic_estimate(&self, score: i32) -> i32 {
        match &self.feature {
            Some(f) => f.modify_heuristic_estimate(score),
            None => score,
        }
    }
}

// ── Terrain ───────────────────────────────────────────────────────────────────

/// Immutable grid of tiles plus the lists derived from it at build time.
#[derive(Debug)]
pub struct Terrain {
    width:      usize,
    height:     usize,
    tiles:      Vec<Tile>,
    io_points:  Vec<GridPoint>,
    attractors: Vec<GridPoint>,
    accessible: usize,
}

impl Terrain {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells, passable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn is_on_board(&self, p: GridPoint) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }

    /// Row-major index of `p`, or `None` when `p` is off the board.
    #[inline]
    pub fn index_of(&self, p: GridPoint) -> Option<usize> {
        self.is_on_board(p)
            .then(|| p.y as usize * self.width + p.x as usize)
    }

    pub fn checked_index(&self, p: GridPoint) -> MsResult<usize> {
        self.index_of(p).ok_or(MsError::OffBoard(p))
    }

    /// Inverse of [`index_of`](Self::index_of).
    #[inline]
    pub fn point_of(&self, index: usize) -> GridPoint {
        GridPoint::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn tile(&self, p: GridPoint) -> Option<&Tile> {
        self.index_of(p).map(|i| &self.tiles[i])
    }

    #[inline]
    pub fn tile_at(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    /// `false` for walls and for anything off the board.
    #[inline]
    pub fn is_passable(&self, p: GridPoint) -> bool {
        self.tile(p).is_some_and(Tile::is_passable)
    }

    pub fn kind(&self, p: GridPoint) -> Option<TileKind> {
        self.tile(p).map(|t| t.kind)
    }

    pub fn feature(&self, p: GridPoint) -> Option<&Arc<Feature>> {
        self.tile(p).and_then(|t| t.feature.as_ref())
    }

    /// Spawner cells in row-major order.
    #[inline]
    pub fn io_points(&self) -> &[GridPoint] {
        &self.io_points
    }

    /// Attractor cells in row-major order.
    #[inline]
    pub fn attractor_points(&self) -> &[GridPoint] {
        &self.attractors
    }

    /// Number of passable cells.
    #[inline]
    pub fn accessible_field_count(&self) -> usize {
        self.accessible
    }

    /// Every point of the grid in row-major order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.tiles.len()).map(|i| self.point_of(i))
    }
}

// ── TerrainBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Terrain`] cell by cell, then call [`build`](Self::build).
///
/// Every cell starts as [`TileKind::Ped4`] floor without a feature.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ms_core::GridPoint;
/// use ms_grid::{Feature, TerrainBuilder};
///
/// let mut b = TerrainBuilder::new(4, 3);
/// b.set_wall(GridPoint::new(1, 1)).unwrap();
/// b.set_feature(GridPoint::new(0, 0), Arc::new(Feature::spawner('S'))).unwrap();
/// let terrain = b.build();
/// assert_eq!(terrain.accessible_field_count(), 11);
/// assert_eq!(terrain.io_points(), &[GridPoint::new(0, 0)]);
/// ```
pub struct TerrainBuilder {
    width:  usize,
    height: usize,
    tiles:  Vec<Tile>,
}

impl TerrainBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::floor(TileKind::Ped4); width * height],
        }
    }

    fn index(&self, p: GridPoint) -> MsResult<usize> {
        if p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height {
            Ok(p.y as usize * self.width + p.x as usize)
        } else {
            Err(MsError::OffBoard(p))
        }
    }

    /// Set the terrain class of `p`, keeping any feature already there.
    pub fn set_kind(&mut self, p: GridPoint, kind: TileKind) -> MsResult<&mut Self> {
        let i = self.index(p)?;
        self.tiles[i].kind = kind;
        Ok(self)
    }

    pub fn set_wall(&mut self, p: GridPoint) -> MsResult<&mut Self> {
        let i = self.index(p)?;
        self.tiles[i] = Tile::WALL;
        Ok(self)
    }

    pub fn set_feature(&mut self, p: GridPoint, feature: Arc<Feature>) -> MsResult<&mut Self> {
        let i = self.index(p)?;
        self.tiles[i].feature = Some(feature);
        Ok(self)
    }

    /// Freeze the layout and derive I/O points, attractors, and the
    /// accessible-cell count.  Features on walls are dropped.
    pub fn build(mut self) -> Terrain {
        let width = self.width;
        let mut io_points  = Vec::new();
        let mut attractors = Vec::new();
        let mut accessible = 0;

        for (i, tile) in self.tiles.iter_mut().enumerate() {
            let p = GridPoint::new((i % width) as i32, (i / width) as i32);
            if !tile.is_passable() {
                if tile.feature.take().is_some() {
                    debug!(%p, "dropping feature placed on a wall");
                }
                continue;
            }
            accessible += 1;
            match tile.feature.as_deref() {
                Some(Feature::Spawner { .. })      => io_points.push(p),
                Some(Feature::Attractor { .. })    => attractors.push(p),
                None => {}
            }
        }

        Terrain {
            width,
            height: self.height,
            tiles: self.tiles,
            io_points,
            attractors,
            accessible,
        }
    }
}
