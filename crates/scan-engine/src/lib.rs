//! Multi-criterion world scanning with predicate fusion.
//!
//! A scan runs many independent search criteria over every chunk of a world
//! in one pass. Criteria that test the same kind of key (block id, entity id,
//! tile-entity kind) are fused into a single indexed dispatcher so the cost per
//! voxel or entity stays flat as criteria are added.
//!
//! ```text
//! ScanConfig ──► factory ──► SearchPlan::new ──► init ──► fuse ──► driver::scan ──► close
//!                  │                                        │
//!            criteria::*                               fusion::{block, identifier, kind}
//! ```
//!
//! Outputs go through [`scan_output`]; the world model comes from
//! [`scan_world`].

mod config;
mod contract;
pub mod criteria;
mod driver;
mod error;
pub mod factory;
pub mod fusion;
mod plan;
pub mod records;

#[cfg(test)]
mod test_support;

pub use config::{DEFAULT_OUTPUT, ScanConfig, help};
pub use contract::{
    AnyCriterion, BlockFilter, ChunkCriterion, Criterion, Domain, EntityCriterion, InitContext,
    TileEntityCriterion, VoxelCriterion,
};
pub use driver::{ScanStats, scan};
pub use error::{ScanError, ScanResult};
pub use factory::parse_criterion;
pub use fusion::{Fusible, fuse};
pub use plan::SearchPlan;
