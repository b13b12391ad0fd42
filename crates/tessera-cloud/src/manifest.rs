//! Manifest records.
//!
//! The manifest is a JSON document listing every tile in emission order:
//!
//! ```json
//! { "tiles": [
//!     { "position": { "x": 1.0, "y": 0.5, "z": 0.5 },
//!       "width": 2.0, "height": 1.0, "depth": 1.0,
//!       "representations": [ { "points": 3, "segment": "tile_0_0.ply" } ] }
//! ] }
//! ```
//!
//! Single-level runs may use the flat shape instead, where each entry is
//! `{ "x", "y", "z", "width", "height", "depth", "segment" }`.

use serde::{Deserialize, Serialize};

/// Top-level manifest document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub tiles: Vec<TileEntry>,
}

/// One tile of the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileEntry {
    Layered(LayeredTile),
    Flat(FlatTile),
}

impl From<LayeredTile> for TileEntry {
    fn from(tile: LayeredTile) -> Self {
        Self::Layered(tile)
    }
}

impl From<FlatTile> for TileEntry {
    fn from(tile: FlatTile) -> Self {
        Self::Flat(tile)
    }
}

/// Tile center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Position {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Tile with a list of representations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayeredTile {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub representations: Vec<RepresentationEntry>,
}

/// One stored representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationEntry {
    pub points: usize,
    pub segment: String,
}

/// Tile with exactly one segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatTile {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub segment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layered_field_names() {
        let manifest = Manifest {
            tiles: vec![TileEntry::Layered(LayeredTile {
                position: Position::from([1.0, 0.5, 0.5]),
                width: 2.0,
                height: 1.0,
                depth: 1.0,
                representations: vec![RepresentationEntry {
                    points: 3,
                    segment: "tile_0_0.ply".into(),
                }],
            })],
        };

        let json = serde_json::to_value(&manifest).unwrap();
        let tile = &json["tiles"][0];
        assert_eq!(tile["position"]["x"], 1.0);
        assert_eq!(tile["width"], 2.0);
        assert_eq!(tile["representations"][0]["points"], 3);
        assert_eq!(tile["representations"][0]["segment"], "tile_0_0.ply");
        assert!(json.get("version").is_none());
    }

    #[test]
    fn test_untagged_entries_read_back() {
        let json = r#"{"tiles":[
            {"x":0.0,"y":0.0,"z":0.0,"width":1.0,"height":1.0,"depth":1.0,"segment":"a/tile_0.ply"},
            {"position":{"x":1.0,"y":1.0,"z":1.0},"width":1.0,"height":1.0,"depth":1.0,
             "representations":[{"points":7,"segment":"tile_1_0.ply"}]}
        ]}"#;

        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert!(matches!(&manifest.tiles[0], TileEntry::Flat(t) if t.segment == "a/tile_0.ply"));
        assert!(matches!(&manifest.tiles[1], TileEntry::Layered(t) if t.representations[0].points == 7));
    }
}
