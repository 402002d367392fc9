//! Block id registry.

use rustc_hash::FxHashMap;

use crate::{ResourceLocation, WorldError, WorldResult};

/// Pre-flattening vanilla block ids.
const LEGACY_BLOCKS: &[(u16, &str)] = &[
    (0, "air"),
    (1, "stone"),
    (2, "grass"),
    (3, "dirt"),
    (4, "cobblestone"),
    (5, "planks"),
    (7, "bedrock"),
    (8, "flowing_water"),
    (9, "water"),
    (10, "flowing_lava"),
    (11, "lava"),
    (12, "sand"),
    (13, "gravel"),
    (14, "gold_ore"),
    (15, "iron_ore"),
    (16, "coal_ore"),
    (17, "log"),
    (18, "leaves"),
    (20, "glass"),
    (35, "wool"),
    (49, "obsidian"),
    (52, "mob_spawner"),
    (54, "chest"),
    (56, "diamond_ore"),
    (63, "standing_sign"),
    (68, "wall_sign"),
    (87, "netherrack"),
    (89, "glowstone"),
    (90, "portal"),
    (130, "ender_chest"),
    (137, "command_block"),
    (146, "trapped_chest"),
    (210, "repeating_command_block"),
    (211, "chain_command_block"),
];

/// Bidirectional mapping between block names and the numeric ids stored in
/// chunk sections.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    by_name: FxHashMap<ResourceLocation, u16>,
    by_id: FxHashMap<u16, ResourceLocation>,
}

impl BlockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the vanilla 1.12 block ids.
    #[must_use]
    pub fn legacy() -> Self {
        let mut registry = Self::new();
        for &(id, path) in LEGACY_BLOCKS {
            let name = ResourceLocation::minecraft(path);
            registry.by_id.insert(id, name.clone());
            registry.by_name.insert(name, id);
        }
        registry
    }

    /// Register a block name under a numeric id.
    pub fn register(&mut self, name: ResourceLocation, id: u16) -> WorldResult<()> {
        if let Some(&existing) = self.by_name.get(&name) {
            return Err(WorldError::DuplicateBlock {
                name: name.to_string(),
                id: existing,
            });
        }
        self.by_id.insert(id, name.clone());
        self.by_name.insert(name, id);
        Ok(())
    }

    /// Resolve a block name. `None` if the save does not know it.
    #[must_use]
    pub fn lookup(&self, name: &ResourceLocation) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    /// Reverse lookup of a numeric id.
    #[must_use]
    pub fn name_of(&self, id: u16) -> Option<&ResourceLocation> {
        self.by_id.get(&id)
    }

    /// Number of registered blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if no blocks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_ids() {
        let registry = BlockRegistry::legacy();
        assert_eq!(registry.lookup(&ResourceLocation::minecraft("chest")), Some(54));
        assert_eq!(registry.lookup(&ResourceLocation::minecraft("air")), Some(0));
        assert_eq!(
            registry.name_of(146),
            Some(&ResourceLocation::minecraft("trapped_chest"))
        );
        assert_eq!(registry.lookup(&ResourceLocation::minecraft("not_a_block")), None);
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = BlockRegistry::new();
        let name = ResourceLocation::new("mymod:ore").unwrap();
        registry.register(name.clone(), 300).unwrap();
        assert_eq!(registry.lookup(&name), Some(300));
        assert!(registry.register(name, 301).is_err());
        assert_eq!(registry.len(), 1);
    }
}
