mod manifest;
mod normalize_plan;
mod pyramid_plan;
mod rotation;
mod tile_config;
mod tile_coord;
mod tile_size_resolver;

pub use manifest::*;
pub use normalize_plan::*;
pub use pyramid_plan::*;
pub use rotation::*;
pub use tile_config::*;
pub use tile_coord::*;
pub use tile_size_resolver::*;
