//! Light clustering.
//!
//! The view frustum is split into a fixed grid of clusters and every frame a
//! compute pass records, per cluster, which lights can reach it. Both render
//! strategies consume the result through the same lookup.
//!
//! Convention:
//! - cluster x/y follow pixels (top-left origin), z follows view depth.
//! - the light-index buffer is laid out in fixed runs of `max_lights_per_cluster`.

mod assign;
mod grid;
mod records;
mod stage;

pub use assign::{assign_lights, ClusterAssignment, OccupancyStats};
pub use grid::{Aabb, ClusterGrid, CLUSTER_WORKGROUP_SIZE};
pub use records::{ClusterParams, ClusterRecord};
pub use stage::LightClusteringStage;
