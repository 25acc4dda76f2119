pub mod aabb;
pub mod bvh;
pub mod camera;
pub mod color;
pub mod consts;
pub mod float;
pub mod intersect;
pub mod model;
pub mod queue;
pub mod renderer;
pub mod scene_load;
pub mod stats;
pub mod triangle;

pub use crate::float::Float;
