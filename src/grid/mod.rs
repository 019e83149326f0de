pub mod direction;
pub mod hex;
pub mod offset_coordinate;

pub use direction::Direction;
pub use hex::{Hex, HexLayout, HexOrientation, Offset};
pub use offset_coordinate::OffsetCoordinate;
