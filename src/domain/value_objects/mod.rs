//! Value objects - Immutable objects defined by their attributes

mod display_name;
mod ids;
mod partition;
mod roll;
mod stat_block;

pub use display_name::display_name;
pub use ids::{PartitionIndex, RunId};
pub use partition::Partition;
pub use roll::RollResult;
pub use stat_block::{Stat, StatBlock};
