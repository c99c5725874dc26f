pub mod planner;

pub use planner::{pair_count, plan_partitions};
