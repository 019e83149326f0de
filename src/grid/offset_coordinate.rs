use glam::IVec2;

/// A column/row coordinate into the rectangular tile storage, with the
/// bottom-left corner of the grid as origin.
///
/// Offset coordinates are what the arena indexes by; axial [`crate::grid::hex::Hex`]
/// coordinates are what the geometry works in. Conversions between the two are
/// on [`crate::grid::hex::Hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetCoordinate(pub IVec2);

impl OffsetCoordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self(IVec2::new(x, y))
    }

    pub const fn to_array(self) -> [i32; 2] {
        [self.0.x, self.0.y]
    }
}

impl From<[i32; 2]> for OffsetCoordinate {
    fn from(value: [i32; 2]) -> Self {
        Self(value.into())
    }
}
