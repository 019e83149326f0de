use core::ops::{Add, Sub};
use std::cmp::{max, min};

use glam::{IVec2, Mat2, Vec2, Vec3};

use crate::grid::{direction::Direction, offset_coordinate::OffsetCoordinate};

pub const SQRT_3: f32 = 1.732_050_8_f32;

/// An axial hex coordinate `(q, r)`. The implicit third cube coordinate is
/// `s = -q - r`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Hex(IVec2);

impl Hex {
    /// The six axial offsets to a hex's neighbors, in
    /// [`HexOrientation::POINTY_EDGE`] / [`HexOrientation::FLAT_EDGE`] order.
    pub const HEX_DIRECTIONS: [Self; 6] = [
        Self::new(1, 0),
        Self::new(1, -1),
        Self::new(0, -1),
        Self::new(-1, 0),
        Self::new(-1, 1),
        Self::new(0, 1),
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self(IVec2::new(q, r))
    }

    pub const fn q(self) -> i32 {
        self.0.x
    }

    pub const fn r(self) -> i32 {
        self.0.y
    }

    pub const fn s(self) -> i32 {
        -self.0.x - self.0.y
    }

    /// Creates a [`Hex`] from an [`OffsetCoordinate`].
    pub const fn from_offset(
        offset_coordinate: OffsetCoordinate,
        orientation: HexOrientation,
        offset: Offset,
    ) -> Self {
        let [x, y] = offset_coordinate.to_array();

        let (q, r) = match orientation {
            HexOrientation::Pointy => (x - (y + offset as i32 * (y & 1)) / 2, y),
            HexOrientation::Flat => (x, y - (x + offset as i32 * (x & 1)) / 2),
        };
        Hex::new(q, r)
    }

    pub const fn to_offset(self, orientation: HexOrientation, offset: Offset) -> OffsetCoordinate {
        let (col, row) = match orientation {
            HexOrientation::Pointy => (
                self.0.x + (self.0.y + offset as i32 * (self.0.y & 1)) / 2,
                self.0.y,
            ),
            HexOrientation::Flat => (
                self.0.x,
                self.0.y + (self.0.x + offset as i32 * (self.0.x & 1)) / 2,
            ),
        };
        OffsetCoordinate::new(col, row)
    }

    /// All six neighboring coordinates. Neighbors may fall outside any given
    /// grid; callers bounds-check.
    pub fn neighbors(self) -> [Hex; 6] {
        Self::HEX_DIRECTIONS.map(|direction| self + direction)
    }

    /// The neighbor in the given edge `direction` for the given `orientation`.
    pub fn neighbor(self, orientation: HexOrientation, direction: Direction) -> Hex {
        let edge_index = orientation.edge_index(direction);
        self + Self::HEX_DIRECTIONS[edge_index]
    }

    /// Coordinate length, equal to the distance from the origin.
    #[inline]
    pub const fn length(self) -> i32 {
        (self.0.x.abs() + self.0.y.abs() + self.s().abs()) / 2
    }

    /// Hex distance from `self` to `rhs`. Symmetric, and zero only when the
    /// coordinates are equal.
    #[inline]
    pub fn distance_to(self, rhs: Self) -> i32 {
        (self - rhs).length()
    }

    /// All hexes exactly `distance` away, walked as a ring. Empty when
    /// `distance` is 0; otherwise `6 * distance` hexes.
    pub fn hexes_at_distance(self, distance: u32) -> Vec<Hex> {
        if distance == 0 {
            return Vec::new();
        }

        let radius = distance as i32;
        let mut hex_list = Vec::with_capacity((6 * distance) as usize);

        let mut hex = Hex(self.0 + Self::HEX_DIRECTIONS[4].0 * radius);
        for hex_direction in Self::HEX_DIRECTIONS {
            for _ in 0..radius {
                hex_list.push(hex);
                hex = hex + hex_direction;
            }
        }

        hex_list
    }

    /// All hexes within `distance` of `self`, including `self`.
    /// `3 * distance * (distance + 1) + 1` hexes.
    pub fn hexes_within_distance(self, distance: u32) -> Vec<Hex> {
        let radius = distance as i32;
        let mut hex_list = Vec::with_capacity((3 * distance * (distance + 1) + 1) as usize);
        for q in -radius..=radius {
            for r in max(-radius, -q - radius)..=min(radius, -q + radius) {
                hex_list.push(self + Hex::new(q, r));
            }
        }
        hex_list
    }

    /// Rounds fractional axial coordinates to the nearest [`Hex`].
    ///
    /// Rounds all three cube coordinates independently, then restores the
    /// `q + r + s = 0` invariant by recomputing whichever axis carries the
    /// largest rounding error.
    pub fn round(fractional_hex: Vec2) -> Self {
        let cube = Vec3::new(
            fractional_hex.x,
            fractional_hex.y,
            -fractional_hex.x - fractional_hex.y,
        );
        let mut rounded = cube.round();
        let diff = (rounded - cube).abs();

        if diff.x > diff.y && diff.x > diff.z {
            rounded.x = -rounded.y - rounded.z;
        } else if diff.y > diff.z {
            rounded.y = -rounded.x - rounded.z;
        } else {
            rounded.z = -rounded.x - rounded.y;
        }

        Self::new(rounded.x as i32, rounded.y as i32)
    }
}

impl Add for Hex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Hex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<[i32; 2]> for Hex {
    #[inline]
    fn from(a: [i32; 2]) -> Self {
        Self(a.into())
    }
}

/// Geometry for converting between hex coordinates and pixel positions.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct HexLayout {
    pub orientation: HexOrientation,
    pub size: Vec2,
    pub origin: Vec2,
}

impl HexLayout {
    pub fn new(orientation: HexOrientation, size: Vec2, origin: Vec2) -> Self {
        Self {
            orientation,
            size,
            origin,
        }
    }

    /// Pixel center of the given hex. Mutual inverse of
    /// [`HexLayout::pixel_to_hex`] within floating tolerance.
    pub fn hex_to_pixel(self, hex: Hex) -> Vec2 {
        let matrix = self.orientation.conversion_matrix().forward_matrix;
        matrix * hex.0.as_vec2() * self.size + self.origin
    }

    /// The hex whose cell contains the given pixel position, resolved via
    /// cube-coordinate rounding.
    pub fn pixel_to_hex(self, pixel_position: Vec2) -> Hex {
        let point = (pixel_position - self.origin) / self.size;
        let matrix = self.orientation.conversion_matrix().inverse_matrix;
        Hex::round(matrix * point)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Offset {
    Even = 1,
    Odd = -1,
}

/// A forward and inverse matrix pair for pixel/hex conversion.
#[derive(Clone, Copy, Debug)]
pub struct ConversionMatrix {
    pub forward_matrix: Mat2,
    pub inverse_matrix: Mat2,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum HexOrientation {
    /// ⬢, pointy-topped
    Pointy,
    /// ⬣, flat-topped
    Flat,
}

impl HexOrientation {
    /// Edge directions of a pointy-topped hex, indexed like
    /// [`Hex::HEX_DIRECTIONS`].
    pub const POINTY_EDGE: [Direction; 6] = [
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// Edge directions of a flat-topped hex, indexed like
    /// [`Hex::HEX_DIRECTIONS`].
    pub const FLAT_EDGE: [Direction; 6] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
        Direction::North,
    ];

    const POINTY_CONVERSION_MATRIX: ConversionMatrix = ConversionMatrix {
        forward_matrix: Mat2::from_cols_array(&[SQRT_3, 0.0, SQRT_3 / 2.0, 3.0 / 2.0]),
        inverse_matrix: Mat2::from_cols_array(&[SQRT_3 / 3.0, 0.0, -1.0 / 3.0, 2.0 / 3.0]),
    };

    const FLAT_CONVERSION_MATRIX: ConversionMatrix = ConversionMatrix {
        forward_matrix: Mat2::from_cols_array(&[3.0 / 2.0, SQRT_3 / 2.0, 0.0, SQRT_3]),
        inverse_matrix: Mat2::from_cols_array(&[2.0 / 3.0, -1.0 / 3.0, 0.0, SQRT_3 / 3.0]),
    };

    #[inline]
    const fn conversion_matrix(self) -> ConversionMatrix {
        match self {
            Self::Pointy => Self::POINTY_CONVERSION_MATRIX,
            Self::Flat => Self::FLAT_CONVERSION_MATRIX,
        }
    }

    /// All edge directions of a hex in this orientation.
    #[inline]
    pub const fn edge_direction(self) -> [Direction; 6] {
        match self {
            HexOrientation::Pointy => Self::POINTY_EDGE,
            HexOrientation::Flat => Self::FLAT_EDGE,
        }
    }

    #[inline]
    /// Index of the given edge direction in [`Hex::HEX_DIRECTIONS`].
    ///
    /// # Panics
    ///
    /// Panics if the direction is not an edge direction for this orientation.
    pub fn edge_index(self, direction: Direction) -> usize {
        self.edge_direction()
            .iter()
            .position(|&x| x == direction)
            .expect("The direction is not a valid edge direction for the hexagon orientation")
    }
}
