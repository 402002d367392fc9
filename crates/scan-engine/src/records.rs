//! Result rows written by the built-in criteria.

use scan_output::Record;
use scan_world::{ChunkPos, NbtCompound};
use tracing::error;

/// Block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Record for Position {
    const FIELDS: &'static [&'static str] = &["x", "y", "z"];

    fn field_values(&self) -> Vec<String> {
        vec![self.x.to_string(), self.y.to_string(), self.z.to_string()]
    }
}

/// One half of a double chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleChestRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub trapped: bool,
}

impl Record for DoubleChestRecord {
    const FIELDS: &'static [&'static str] = &["x", "y", "z", "trapped"];

    fn field_values(&self) -> Vec<String> {
        vec![
            self.x.to_string(),
            self.y.to_string(),
            self.z.to_string(),
            self.trapped.to_string(),
        ]
    }
}

/// Chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl From<ChunkPos> for ChunkPosition {
    fn from(pos: ChunkPos) -> Self {
        Self { x: pos.x, z: pos.z }
    }
}

impl Record for ChunkPosition {
    const FIELDS: &'static [&'static str] = &["x", "z"];

    fn field_values(&self) -> Vec<String> {
        vec![self.x.to_string(), self.z.to_string()]
    }
}

/// Per-chunk occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCount {
    pub x: i32,
    pub z: i32,
    pub count: u64,
}

impl Record for ChunkCount {
    const FIELDS: &'static [&'static str] = &["x", "z", "count"];

    fn field_values(&self) -> Vec<String> {
        vec![
            self.x.to_string(),
            self.z.to_string(),
            self.count.to_string(),
        ]
    }
}

/// An entity with its NBT as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub nbt: String,
}

impl Record for EntityRecord {
    const FIELDS: &'static [&'static str] = &["id", "x", "y", "z", "nbt"];

    fn field_values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.x.to_string(),
            self.y.to_string(),
            self.z.to_string(),
            self.nbt.clone(),
        ]
    }
}

/// A tile entity with its NBT as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEntityRecord {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub nbt: String,
}

impl Record for TileEntityRecord {
    const FIELDS: &'static [&'static str] = &["id", "x", "y", "z", "nbt"];

    fn field_values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.x.to_string(),
            self.y.to_string(),
            self.z.to_string(),
            self.nbt.clone(),
        ]
    }
}

/// A mob spawner and the entities it can spawn, `;`-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnerRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub id: String,
}

impl Record for SpawnerRecord {
    const FIELDS: &'static [&'static str] = &["x", "y", "z", "id"];

    fn field_values(&self) -> Vec<String> {
        vec![
            self.x.to_string(),
            self.y.to_string(),
            self.z.to_string(),
            self.id.clone(),
        ]
    }
}

/// Sign text plus the block it is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub lines: [String; 4],
    /// `standing_sign`, `wall_sign` or `invalid_id_<id>`.
    pub kind: String,
    pub direction: &'static str,
}

impl Record for SignRecord {
    const FIELDS: &'static [&'static str] = &[
        "x", "y", "z", "line1", "line2", "line3", "line4", "type", "direction",
    ];

    fn field_values(&self) -> Vec<String> {
        let mut values = vec![self.x.to_string(), self.y.to_string(), self.z.to_string()];
        values.extend(self.lines.iter().cloned());
        values.push(self.kind.clone());
        values.push(self.direction.to_string());
        values
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBlockRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub command: String,
    pub last_output: String,
}

impl Record for CommandBlockRecord {
    const FIELDS: &'static [&'static str] = &["x", "y", "z", "command", "last_output"];

    fn field_values(&self) -> Vec<String> {
        vec![
            self.x.to_string(),
            self.y.to_string(),
            self.z.to_string(),
            self.command.clone(),
            self.last_output.clone(),
        ]
    }
}

/// Mean column height over the whole scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRecord {
    pub height: f64,
}

impl Record for HeightRecord {
    const FIELDS: &'static [&'static str] = &["height"];

    fn field_values(&self) -> Vec<String> {
        vec![self.height.to_string()]
    }
}

/// NBT compound rendered as compact JSON.
pub(crate) fn nbt_json(nbt: &NbtCompound) -> String {
    match serde_json::to_string(nbt) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialise NBT: {e}");
            String::from("{}")
        }
    }
}
