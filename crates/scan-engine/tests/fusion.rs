//! Fusion properties checked through the public API.

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use scan_engine::criteria::{
    BlockCriterion, CommandBlockCriterion, EntitySearch, SignCriterion, SignTextMode,
    SpawnerCriterion, TileEntitySearch,
};
use scan_engine::fusion::{FusedBlockCriterion, MergeHook};
use scan_engine::{
    AnyCriterion, BlockFilter, Criterion, EntityCriterion, Fusible, InitContext, ScanError,
    ScanResult, SearchPlan, TileEntityCriterion, VoxelCriterion, fuse, scan,
};
use scan_output::{MemorySinkFactory, MemoryStore};
use scan_world::{
    BlockRegistry, Chunk, Entity, NbtCompound, ResourceLocation, SpawnEntry, TileEntity,
    TileEntityData, TileEntityKind, Voxel, World,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn world() -> World {
    World::new(0, BlockRegistry::legacy())
}

fn id(path: &str) -> ResourceLocation {
    ResourceLocation::minecraft(path)
}

fn block(path: &str, meta: Option<u8>) -> AnyCriterion {
    AnyCriterion::Voxel(Box::new(BlockCriterion::new(id(path), meta)))
}

fn entity(filter: Option<&str>) -> AnyCriterion {
    AnyCriterion::Entity(Box::new(EntitySearch::new(filter.map(id))))
}

fn tile_entity(filter: Option<&str>) -> AnyCriterion {
    AnyCriterion::TileEntity(Box::new(TileEntitySearch::new(filter.map(id))))
}

fn spawner(filter: Option<&str>) -> AnyCriterion {
    AnyCriterion::TileEntity(Box::new(SpawnerCriterion::new(filter.map(id))))
}

fn criteria() -> Vec<AnyCriterion> {
    vec![
        block("stone", None),
        block("wool", Some(14)),
        block("wool", None),
        block("diamond_ore", None),
        block("air", Some(0)),
        entity(Some("zombie")),
        entity(Some("skeleton")),
        entity(None),
        tile_entity(Some("chest")),
        tile_entity(Some("mob_spawner")),
        tile_entity(None),
        spawner(None),
        spawner(Some("zombie")),
        AnyCriterion::TileEntity(Box::new(SignCriterion::new(SignTextMode::PlainText))),
        AnyCriterion::TileEntity(Box::new(
            CommandBlockCriterion::new(Some("/say .*")).unwrap(),
        )),
    ]
}

fn spawner_at(x: i32, mob: &str) -> TileEntity {
    TileEntity::new(
        id("mob_spawner"),
        x,
        20,
        3,
        TileEntityData::MobSpawner {
            spawns: vec![SpawnEntry {
                id: id(mob),
                weight: 1,
            }],
        },
    )
}

fn chunks() -> Vec<Chunk> {
    let mut a = Chunk::new(0, 0);
    a.set_block(0, 1, 0, 1, 0);
    a.set_block(1, 1, 0, 35, 14);
    a.set_block(2, 1, 0, 35, 3);
    a.set_block(3, 40, 7, 56, 0);
    a.add_entity(Entity::new(id("zombie"), 1.5, 2.0, 1.5));
    a.add_entity(Entity::new(id("pig"), 4.5, 2.0, 1.5));
    a.add_tile_entity(spawner_at(5, "zombie"));
    a.add_tile_entity(spawner_at(6, "cave_spider"));
    a.add_tile_entity(TileEntity::new(
        id("chest"),
        7,
        1,
        1,
        TileEntityData::Generic(NbtCompound::new()),
    ));
    a.add_tile_entity(TileEntity::new(
        id("sign"),
        8,
        1,
        1,
        TileEntityData::Sign {
            lines: ["a".into(), "b".into(), "c".into(), "d".into()],
        },
    ));

    let mut b = Chunk::new(-3, 9);
    b.set_block(15, 255, 15, 35, 14);
    b.add_entity(Entity::new(id("skeleton"), -40.0, 70.0, 150.0));
    b.add_tile_entity(TileEntity::new(
        id("command_block"),
        -40,
        4,
        150,
        TileEntityData::CommandBlock {
            command: "/say hello".into(),
            last_output: String::new(),
        },
    ));

    vec![a, b, Chunk::new(1, 1)]
}

/// Run a plan over the fixture chunks in order and return the sink store.
fn run(fused: bool) -> (MemoryStore, Vec<String>) {
    init_tracing();
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(criteria());
    plan.init(&world, &sinks).unwrap();
    if fused {
        plan.fuse();
    }
    let names = plan.names();
    for chunk in &chunks() {
        plan.visit_chunk(chunk);
    }
    plan.close().unwrap();
    (sinks.store(), names)
}

#[test]
fn test_fused_and_unfused_write_identical_rows() {
    let (plain, plain_names) = run(false);
    let (fused, fused_names) = run(true);

    assert_eq!(plain_names.len(), 15);
    assert_eq!(
        fused_names,
        vec![
            "Merged Blocks (5 criteria)".to_string(),
            "Entities".to_string(),
            "Merged Entities (2 criteria)".to_string(),
            "Tile Entities".to_string(),
            "Merged Tile Entities by id (2 criteria)".to_string(),
            "Merged Tile Entities by kind (4 criteria)".to_string(),
        ]
    );

    assert_eq!(plain.names(), fused.names());
    for name in plain.names() {
        assert_eq!(plain.table(&name), fused.table(&name), "{name}");
    }

    assert_eq!(fused.rows("Block (id=minecraft:wool)").len(), 3);
    assert_eq!(fused.rows("Block (id=minecraft:wool, meta=14)").len(), 2);
    assert_eq!(fused.rows("Spawners").len(), 2);
    assert_eq!(fused.rows("Spawners (id=minecraft:zombie)").len(), 1);
    assert_eq!(fused.rows("Command Blocks (regex=/say .*)").len(), 1);
}

/// A spread of chunks across several regions with varied blocks and mobs.
fn scattered_chunks(count: usize) -> Vec<Chunk> {
    (0..count)
        .map(|i| {
            let x = i32::try_from(i % 20).unwrap() - 10;
            let z = i32::try_from(i / 20).unwrap() * 7 - 30;
            let mut chunk = Chunk::new(x * 5, z);
            let y = i32::try_from(i % 60).unwrap();
            chunk.set_block(i % 16, y, 3, 1, 0);
            chunk.set_block(2, y + 1, i % 16, 35, u8::try_from(i % 16).unwrap());
            chunk.set_block(15 - i % 16, 200, 15, 35, 14);
            if i % 3 == 0 {
                chunk.set_block(7, 12, 7, 56, 0);
                chunk.set_block(8, 12, 7, 14, 0);
            }
            let mob = ["zombie", "skeleton", "pig"][i % 3];
            chunk.add_entity(Entity::new(id(mob), f64::from(x) * 80.0, 64.0, 0.5));
            chunk.add_tile_entity(spawner_at(x * 80, mob));
            chunk
        })
        .collect()
}

fn scan_store(fused: bool, chunks: &[Chunk]) -> MemoryStore {
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(vec![
        block("stone", None),
        block("wool", None),
        block("wool", Some(14)),
        block("diamond_ore", None),
        block("gold_ore", None),
        entity(Some("zombie")),
        entity(Some("skeleton")),
        entity(None),
        spawner(Some("zombie")),
        tile_entity(Some("mob_spawner")),
        tile_entity(Some("chest")),
    ]);
    plan.init(&world, &sinks).unwrap();
    if fused {
        plan.fuse();
    }
    let stats = scan(&plan, chunks);
    assert_eq!(stats.chunks, chunks.len() as u64);
    plan.close().unwrap();
    sinks.store()
}

#[test]
fn test_parallel_scan_matches_unfused_rows() {
    init_tracing();
    let chunks = scattered_chunks(200);
    let plain = scan_store(false, &chunks);
    let fused = scan_store(true, &chunks);

    assert_eq!(plain.names(), fused.names());
    for name in plain.names() {
        let mut expected = plain.rows(&name);
        let mut actual = fused.rows(&name);
        expected.sort();
        actual.sort();
        assert_eq!(expected, actual, "{name}");
        assert_eq!(fused.table(&name).unwrap().closes, 1, "{name}");
    }

    assert_eq!(fused.rows("Block (id=minecraft:stone)").len(), 200);
    assert_eq!(fused.rows("Block (id=minecraft:gold_ore)").len(), 67);
    assert_eq!(fused.rows("Entities").len(), 200);
    assert_eq!(fused.rows("Entities (id=minecraft:zombie)").len(), 67);
}

#[test]
fn test_every_output_closed_once() {
    let (store, _) = run(true);
    assert_eq!(store.len(), 15);
    for name in store.names() {
        assert_eq!(store.table(&name).unwrap().closes, 1, "{name}");
    }
}

#[test]
fn test_fusion_is_idempotent() {
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(criteria());
    plan.init(&world, &sinks).unwrap();

    plan.fuse();
    let once = plan.names();
    plan.fuse();
    assert_eq!(plan.names(), once);
    plan.close().unwrap();
}

#[test]
fn test_block_threshold() {
    let world = world();
    let sinks = MemorySinkFactory::new();

    let mut two = SearchPlan::new(vec![block("stone", None), block("dirt", None)]);
    two.init(&world, &sinks).unwrap();
    two.fuse();
    assert_eq!(
        two.names(),
        vec![
            "Block (id=minecraft:stone)".to_string(),
            "Block (id=minecraft:dirt)".to_string(),
        ]
    );

    let mut three = SearchPlan::new(vec![
        block("stone", None),
        block("dirt", None),
        block("sand", None),
    ]);
    three.init(&world, &sinks).unwrap();
    three.fuse();
    assert_eq!(three.names(), vec!["Merged Blocks (3 criteria)".to_string()]);
}

#[test]
fn test_ranged_blocks_stay_unfused() {
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(vec![
        block("stone", None),
        block("dirt", None),
        scan_engine::parse_criterion("--block,id=sand,min=10,max=20").unwrap(),
    ]);
    plan.init(&world, &sinks).unwrap();
    plan.fuse();
    assert_eq!(plan.names().len(), 3);
}

#[test]
fn test_entity_scenario() {
    // zombie, skeleton and a wildcard: only the two filtered criteria fuse
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(vec![
        entity(Some("zombie")),
        entity(Some("skeleton")),
        entity(None),
    ]);
    plan.init(&world, &sinks).unwrap();
    plan.fuse();
    assert_eq!(
        plan.names(),
        vec![
            "Entities".to_string(),
            "Merged Entities (2 criteria)".to_string(),
        ]
    );

    let mut chunk = Chunk::new(0, 0);
    for mob in ["zombie", "skeleton", "creeper", "zombie"] {
        chunk.add_entity(Entity::new(id(mob), 0.0, 0.0, 0.0));
    }
    plan.visit_chunk(&chunk);
    plan.close().unwrap();

    let store = sinks.store();
    assert_eq!(store.rows("Entities (id=minecraft:zombie)").len(), 2);
    assert_eq!(store.rows("Entities (id=minecraft:skeleton)").len(), 1);
    assert_eq!(store.rows("Entities").len(), 4);
}

#[test]
fn test_tile_entities_grouped_by_id_then_kind() {
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(vec![
        tile_entity(Some("mob_spawner")),
        spawner(None),
        tile_entity(Some("chest")),
        spawner(Some("zombie")),
    ]);
    plan.init(&world, &sinks).unwrap();
    plan.fuse();
    assert_eq!(
        plan.names(),
        vec![
            "Merged Tile Entities by id (2 criteria)".to_string(),
            "Merged Tile Entities by kind (2 criteria)".to_string(),
        ]
    );
    plan.close().unwrap();
}

#[test]
fn test_single_kind_criterion_not_fused() {
    let world = world();
    let sinks = MemorySinkFactory::new();
    let mut plan = SearchPlan::new(vec![spawner(None), tile_entity(Some("chest"))]);
    plan.init(&world, &sinks).unwrap();
    plan.fuse();
    assert_eq!(
        plan.names(),
        vec![
            "Spawners".to_string(),
            "Tile Entities (id=minecraft:chest)".to_string(),
        ]
    );
    plan.close().unwrap();
}

/// Tile-entity criterion declaring both an id and a kind.
struct Tagged {
    id: ResourceLocation,
}

impl fmt::Display for Tagged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tagged ({})", self.id)
    }
}

impl Criterion for Tagged {
    fn init(&mut self, _ctx: &InitContext<'_>) -> ScanResult<()> {
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        Ok(())
    }
}

impl TileEntityCriterion for Tagged {
    fn visit(&self, _chunk: &Chunk, _tile_entity: &TileEntity) {}

    fn id_filter(&self) -> Option<&ResourceLocation> {
        Some(&self.id)
    }

    fn kind_filter(&self) -> Option<TileEntityKind> {
        Some(TileEntityKind::MobSpawner)
    }
}

#[test]
fn test_declared_id_wins_over_kind() {
    let criteria: Vec<Box<dyn TileEntityCriterion>> = vec![
        Box::new(Tagged {
            id: id("mob_spawner"),
        }),
        Box::new(SpawnerCriterion::new(None)),
    ];
    let names: Vec<String> = fuse(criteria).iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["Tagged (minecraft:mob_spawner)", "Spawners"]);

    let criteria: Vec<Box<dyn TileEntityCriterion>> = vec![
        Box::new(Tagged {
            id: id("mob_spawner"),
        }),
        Box::new(SpawnerCriterion::new(None)),
        Box::new(TileEntitySearch::new(Some(id("chest")))),
    ];
    let names: Vec<String> = fuse(criteria).iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        vec![
            "Spawners",
            "Merged Tile Entities by id (2 criteria)",
        ]
    );
}

#[test]
fn test_empty_and_singleton() {
    assert!(fuse::<Box<dyn VoxelCriterion>>(Vec::new()).is_empty());

    let single: Vec<Box<dyn EntityCriterion>> = vec![Box::new(EntitySearch::new(Some(id("pig"))))];
    let fused = fuse(single);
    assert_eq!(fused.len(), 1);
    assert_eq!(fused[0].to_string(), "Entities (id=minecraft:pig)");
}

#[test]
fn test_fused_criterion_rejects_init() {
    let world = world();
    let sinks = MemorySinkFactory::new();
    let members: Vec<Box<dyn VoxelCriterion>> = (0..3)
        .map(|meta| Box::new(Probe::new(meta, Arc::default())) as Box<dyn VoxelCriterion>)
        .collect();
    let mut fused = FusedBlockCriterion::new(members);

    let result = fused.init(&InitContext::new(&world, &sinks));
    assert!(matches!(
        result,
        Err(ScanError::FusedInit(name)) if name == "Merged Blocks (3 criteria)"
    ));
}

/// Voxel criterion recording every match into a shared log.
struct Probe {
    name: String,
    filter: BlockFilter,
    log: Arc<Mutex<Vec<String>>>,
    closes: usize,
}

impl Probe {
    fn new(meta: u8, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: format!("probe {meta}"),
            filter: BlockFilter {
                id: 1,
                meta: Some(meta),
            },
            log,
            closes: 0,
        }
    }

    fn any(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            filter: BlockFilter { id: 1, meta: None },
            log,
            closes: 0,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Criterion for Probe {
    fn init(&mut self, _ctx: &InitContext<'_>) -> ScanResult<()> {
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        self.closes += 1;
        assert_eq!(self.closes, 1, "{} closed twice", self.name);
        self.log.lock().push(format!("close {}", self.name));
        Ok(())
    }
}

impl VoxelCriterion for Probe {
    fn visit(&self, voxel: &Voxel) {
        if self.filter.matches(voxel.id, voxel.meta) {
            self.accept_match(voxel);
        }
    }

    fn block_filter(&self) -> Option<BlockFilter> {
        Some(self.filter)
    }

    fn accept_match(&self, voxel: &Voxel) {
        self.log.lock().push(format!("{} @ {}", self.name, voxel.y));
    }
}

#[test]
fn test_composite_slot_keeps_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let criteria: Vec<Box<dyn VoxelCriterion>> = vec![
        Box::new(Probe::any("first", log.clone())),
        Box::new(Probe::new(2, log.clone())),
        Box::new(Probe::any("third", log.clone())),
    ];

    let mut fused = fuse(criteria);
    assert_eq!(fused.len(), 1);

    fused[0].visit(&Voxel {
        id: 1,
        meta: 2,
        x: 0,
        y: 7,
        z: 0,
    });
    fused[0].visit(&Voxel {
        id: 1,
        meta: 5,
        x: 0,
        y: 8,
        z: 0,
    });
    fused[0].visit(&Voxel {
        id: 2,
        meta: 2,
        x: 0,
        y: 9,
        z: 0,
    });
    fused[0].close().unwrap();
    fused[0].close().unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "first @ 7",
            "probe 2 @ 7",
            "third @ 7",
            "first @ 8",
            "third @ 8",
            "close first",
            "close probe 2",
            "close third",
        ]
    );
}

/// Minimal fusible token used to exercise the generic loop directly.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Leaf(u32),
    Pair(u32, u32),
    Broken,
}

fn pair_leaves(working: &mut Vec<Token>, emit: &mut dyn FnMut(Token)) {
    let leaves: Vec<usize> = working
        .iter()
        .enumerate()
        .filter(|(_, t)| matches!(t, Token::Leaf(_)))
        .map(|(i, _)| i)
        .take(2)
        .collect();
    if let [a, b] = leaves[..] {
        let (Token::Leaf(y), Token::Leaf(x)) = (working.remove(b), working.remove(a)) else {
            unreachable!();
        };
        emit(Token::Pair(x, y));
    }
}

fn drop_without_producing(working: &mut Vec<Token>, _emit: &mut dyn FnMut(Token)) {
    working.retain(|t| *t != Token::Broken);
}

impl Fusible for Token {
    fn merge_hook(&self) -> Option<MergeHook<Self>> {
        match self {
            Self::Leaf(_) => Some(pair_leaves as MergeHook<Self>),
            Self::Pair(..) => None,
            Self::Broken => Some(drop_without_producing as MergeHook<Self>),
        }
    }
}

#[test]
fn test_generic_loop_reaches_fixed_point() {
    let fused = fuse((0..5).map(Token::Leaf).collect());
    assert_eq!(
        fused,
        vec![Token::Leaf(4), Token::Pair(0, 1), Token::Pair(2, 3)]
    );
}

#[test]
#[should_panic(expected = "without producing")]
fn test_hook_removing_without_producing_panics() {
    let _ = fuse(vec![Token::Broken]);
}
