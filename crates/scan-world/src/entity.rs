//! Entities and tile entities stored in a chunk.
//!
//! Tile entities are classified into a closed set of structural kinds when
//! they are built from NBT. Scanners that care about representation match on
//! [`TileEntityKind`] instead of the declared id.

use crate::{NbtCompound, NbtList, NbtValue, ResourceLocation};

/// A free-moving entity (mob, item, minecart, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: ResourceLocation,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Full NBT of the entity.
    pub data: NbtCompound,
}

impl Entity {
    #[must_use]
    pub fn new(id: ResourceLocation, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x,
            y,
            z,
            data: NbtCompound::new(),
        }
    }

    /// Attach NBT data.
    #[must_use]
    pub fn with_data(mut self, data: NbtCompound) -> Self {
        self.data = data;
        self
    }
}

/// One potential spawn of a mob spawner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnEntry {
    pub id: ResourceLocation,
    pub weight: i32,
}

/// Fieldless tag of [`TileEntityData`], used as a dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileEntityKind {
    Sign,
    MobSpawner,
    CommandBlock,
    Generic,
}

/// Decoded payload of a tile entity.
#[derive(Debug, Clone, PartialEq)]
pub enum TileEntityData {
    /// Four raw text lines (JSON text components in modern saves).
    Sign { lines: [String; 4] },
    MobSpawner { spawns: Vec<SpawnEntry> },
    CommandBlock {
        command: String,
        last_output: String,
    },
    /// Any tile entity without a dedicated representation.
    Generic(NbtCompound),
}

impl TileEntityData {
    #[must_use]
    pub const fn kind(&self) -> TileEntityKind {
        match self {
            Self::Sign { .. } => TileEntityKind::Sign,
            Self::MobSpawner { .. } => TileEntityKind::MobSpawner,
            Self::CommandBlock { .. } => TileEntityKind::CommandBlock,
            Self::Generic(_) => TileEntityKind::Generic,
        }
    }

    /// Classify raw tile entity NBT by its declared id.
    ///
    /// Unknown ids, and known ids whose NBT is missing the expected tags, keep
    /// the full compound as [`TileEntityData::Generic`].
    #[must_use]
    pub fn from_nbt(id: &ResourceLocation, nbt: NbtCompound) -> Self {
        let decoded = match id.as_str() {
            "minecraft:sign" => decode_sign(&nbt),
            "minecraft:mob_spawner" => decode_spawner(&nbt),
            "minecraft:command_block" => decode_command_block(&nbt),
            _ => None,
        };
        decoded.unwrap_or(Self::Generic(nbt))
    }

    /// NBT view of this payload, used when exporting a tile entity.
    #[must_use]
    pub fn to_nbt(&self) -> NbtCompound {
        match self {
            Self::Sign { lines } => {
                let mut nbt = NbtCompound::new();
                for (i, line) in lines.iter().enumerate() {
                    nbt.insert(format!("Text{}", i + 1), line.as_str());
                }
                nbt
            }
            Self::MobSpawner { spawns } => {
                let potentials = spawns
                    .iter()
                    .map(|spawn| {
                        let mut entity = NbtCompound::new();
                        entity.insert("id", spawn.id.as_str());
                        let mut entry = NbtCompound::new();
                        entry.insert("Entity", entity);
                        entry.insert("Weight", spawn.weight);
                        entry
                    })
                    .collect();
                let mut nbt = NbtCompound::new();
                nbt.insert("SpawnPotentials", NbtList::Compound(potentials));
                nbt
            }
            Self::CommandBlock {
                command,
                last_output,
            } => {
                let mut nbt = NbtCompound::new();
                nbt.insert("Command", command.as_str());
                nbt.insert("LastOutput", last_output.as_str());
                nbt
            }
            Self::Generic(nbt) => nbt.clone(),
        }
    }
}

fn decode_sign(nbt: &NbtCompound) -> Option<TileEntityData> {
    let line = |i: usize| nbt.get_str(&format!("Text{i}")).map(str::to_string);
    Some(TileEntityData::Sign {
        lines: [line(1)?, line(2)?, line(3)?, line(4)?],
    })
}

fn decode_spawner(nbt: &NbtCompound) -> Option<TileEntityData> {
    let spawns = match nbt.get("SpawnPotentials") {
        Some(NbtValue::List(NbtList::Compound(entries))) => entries
            .iter()
            .map(|entry| {
                let id = entry.get_compound("Entity")?.get_str("id")?;
                let weight = match entry.get("Weight") {
                    Some(NbtValue::Int(weight)) => *weight,
                    _ => 1,
                };
                Some(SpawnEntry {
                    id: ResourceLocation::new(id).ok()?,
                    weight,
                })
            })
            .collect::<Option<Vec<_>>>()?,
        Some(NbtValue::List(NbtList::Empty)) => Vec::new(),
        _ => {
            let id = nbt.get_compound("SpawnData")?.get_str("id")?;
            vec![SpawnEntry {
                id: ResourceLocation::new(id).ok()?,
                weight: 1,
            }]
        }
    };
    Some(TileEntityData::MobSpawner { spawns })
}

fn decode_command_block(nbt: &NbtCompound) -> Option<TileEntityData> {
    Some(TileEntityData::CommandBlock {
        command: nbt.get_str("Command")?.to_string(),
        last_output: nbt.get_str("LastOutput").unwrap_or_default().to_string(),
    })
}

/// A block-attached entity (chest contents, sign text, spawner config, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct TileEntity {
    pub id: ResourceLocation,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub data: TileEntityData,
}

impl TileEntity {
    #[must_use]
    pub const fn new(id: ResourceLocation, x: i32, y: i32, z: i32, data: TileEntityData) -> Self {
        Self { id, x, y, z, data }
    }

    /// Build a tile entity from its raw NBT, classifying the payload.
    #[must_use]
    pub fn from_nbt(id: ResourceLocation, x: i32, y: i32, z: i32, nbt: NbtCompound) -> Self {
        let data = TileEntityData::from_nbt(&id, nbt);
        Self { id, x, y, z, data }
    }

    #[must_use]
    pub const fn kind(&self) -> TileEntityKind {
        self.data.kind()
    }

    /// Whether this is a mob spawner able to spawn the given entity.
    #[must_use]
    pub fn can_spawn(&self, entity: &ResourceLocation) -> bool {
        match &self.data {
            TileEntityData::MobSpawner { spawns } => spawns.iter().any(|s| s.id == *entity),
            _ => false,
        }
    }
}
