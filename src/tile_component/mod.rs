pub mod building;
pub mod resource;
pub mod terrain;

pub use building::{Building, BuildingKind};
pub use resource::{Quality, Resource};
pub use terrain::Terrain;
