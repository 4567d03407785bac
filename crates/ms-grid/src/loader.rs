//! Text map loader.
//!
//! A venue is described by three files sharing a stem:
//!
//! | File                | Contents                                      |
//! |---------------------|-----------------------------------------------|
//! | `<name>_map.txt`    | terrain layer, one character per cell         |
//! | `<name>_feat.txt`   | feature layer, same dimensions                |
//! | `<name>_legend.csv` | feature legend                                |
//!
//! Terrain codes:
//!
//! | Code | Tile                        |
//! |------|-----------------------------|
//! | `#`  | wall                        |
//! | `.`  | `Ped4` floor                |
//! | `~`  | `SocialForce` floor         |
//!
//! In the feature layer `.` and space mean "no feature"; every other
//! character must appear in the legend:
//!
//! ```csv
//! code,kind,pull,hold_time
//! S,spawner,,
//! A,attractor,100,3
//! ```
//!
//! Each legend row becomes exactly one `Arc<Feature>`, shared by every cell
//! carrying that code.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use ms_core::{GridPoint, MsError};

use crate::{Feature, GridError, GridResult, Terrain, TerrainBuilder, TileKind};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LegendRecord {
    code:      String,
    kind:      String,
    pull:      Option<i32>,
    hold_time: Option<u32>,
}

/// Feature instances keyed by legend code.
pub type Legend = HashMap<char, Arc<Feature>>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a venue from `<name>_map.<ext>`, deriving the feature layer and
/// legend paths from it (see [`sibling_paths`]).
pub fn load_map_files(terrain_path: &Path) -> GridResult<Terrain> {
    let (feature_path, legend_path) = sibling_paths(terrain_path)?;
    let terrain = std::fs::File::open(terrain_path).map_err(MsError::Io)?;
    let features = std::fs::File::open(&feature_path).map_err(MsError::Io)?;
    let legend = std::fs::File::open(&legend_path).map_err(MsError::Io)?;
    load_map_reader(terrain, features, legend)
}

/// Feature layer and legend paths belonging to a terrain layer path.
///
/// `mall_map.txt` yields `mall_feat.txt` and `mall_legend.csv`.
pub fn sibling_paths(terrain_path: &Path) -> GridResult<(PathBuf, PathBuf)> {
    let name = terrain_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GridError::Map(format!("bad map path {}", terrain_path.display())))?;
    let Some(cut) = name.rfind("_map.") else {
        return Err(GridError::Map(format!(
            "map file name {name:?} does not contain \"_map.\""
        )));
    };
    let stem = &name[..cut];
    let ext = &name[cut + "_map.".len()..];
    Ok((
        terrain_path.with_file_name(format!("{stem}_feat.{ext}")),
        terrain_path.with_file_name(format!("{stem}_legend.csv")),
    ))
}

/// Like [`load_map_files`] but accepts any `Read` sources.
pub fn load_map_reader<T: Read, F: Read, L: Read>(
    terrain: T,
    features: F,
    legend: L,
) -> GridResult<Terrain> {
    let legend   = parse_legend(legend)?;
    let terrain  = read_layer(terrain, "terrain")?;
    let features = read_layer(features, "feature")?;

    let height = terrain.len();
    let width  = terrain.first().map_or(0, Vec::len);
    let feature_w = features.first().map_or(0, Vec::len);
    if features.len() != height || feature_w != width {
        return Err(GridError::DimensionMismatch {
            terrain_w: width,
            terrain_h: height,
            feature_w,
            feature_h: features.len(),
        });
    }

    let mut b = TerrainBuilder::new(width, height);
    for (y, (t_row, f_row)) in terrain.iter().zip(&features).enumerate() {
        for (x, (&t, &f)) in t_row.iter().zip(f_row).enumerate() {
            let at = GridPoint::new(x as i32, y as i32);
            match t {
                '#' => {
                    b.set_wall(at)?;
                    continue;
                }
                '.' => b.set_kind(at, TileKind::Ped4)?,
                '~' => b.set_kind(at, TileKind::SocialForce)?,
                code => return Err(GridError::UnknownTerrain { code, at }),
            };
            if f == '.' || f == ' ' {
                continue;
            }
            let feature = legend
                .get(&f)
                .ok_or(GridError::UnknownFeature { code: f, at })?;
            b.set_feature(at, Arc::clone(feature))?;
        }
    }

    let terrain = b.build();
    info!(
        width,
        height,
        accessible = terrain.accessible_field_count(),
        io_points = terrain.io_points().len(),
        attractors = terrain.attractor_points().len(),
        legend = legend.len(),
        "map loaded"
    );
    Ok(terrain)
}

/// Parse a legend CSV into one shared feature per code.
pub fn parse_legend<R: Read>(reader: R) -> GridResult<Legend> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut legend = Legend::new();

    for result in csv_reader.deserialize::<LegendRecord>() {
        let row = result?;
        let mut chars = row.code.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(MsError::Parse(format!(
                    "legend code {:?} must be a single character",
                    row.code
                ))
                .into());
            }
        };
        if matches!(code, '.' | ' ') {
            return Err(MsError::Parse(format!("legend code {code:?} is reserved for \"no feature\"")).into());
        }

        let feature = match row.kind.to_ascii_lowercase().as_str() {
            "spawner" => Feature::spawner(code),
            "attractor" => {
                let (Some(pull), Some(hold_time)) = (row.pull, row.hold_time) else {
                    return Err(MsError::Parse(format!(
                        "attractor {code:?} needs both pull and hold_time"
                    ))
                    .into());
                };
                Feature::attractor(code, pull, hold_time)
            }
            other => {
                return Err(MsError::Parse(format!(
                    "legend code {code:?}: unknown feature kind {other:?}, expected \"attractor\" or \"spawner\""
                ))
                .into());
            }
        };
        if legend.insert(code, Arc::new(feature)).is_some() {
            return Err(MsError::Parse(format!("legend code {code:?} defined twice")).into());
        }
    }

    Ok(legend)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Read a character grid, dropping trailing blank lines.  All rows must have
/// the same length.
fn read_layer<R: Read>(reader: R, layer: &str) -> GridResult<Vec<Vec<char>>> {
    let mut rows: Vec<Vec<char>> = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line.map_err(MsError::Io)?;
        rows.push(line.trim_end_matches('\r').chars().collect());
    }
    while rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }

    if let Some(first) = rows.first() {
        let width = first.len();
        if let Some(y) = rows.iter().position(|r| r.len() != width) {
            return Err(GridError::Map(format!(
                "{layer} layer row {y} has {} cells, expected {width}",
                rows[y].len()
            )));
        }
    }
    Ok(rows)
}
