//! Mine management - regions, distributions, scheduling, persistence

pub mod config;
pub mod distribution;
pub mod manager;
#[allow(clippy::module_inception)]
mod mine;
pub mod region;
pub mod store;

pub use config::{MineTypeTemplate, MineTypes};
pub use distribution::{
    blend_layers, depth_fraction, DistributionLayer, MaterialSampler, WeightedEntry,
    WEIGHT_PRECISION,
};
pub use manager::MineManager;
pub use mine::Mine;
pub use region::Region;
pub use store::MineStore;
