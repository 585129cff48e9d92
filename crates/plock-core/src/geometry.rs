#![forbid(unsafe_code)]

//! Geometric primitives for the lock grid.
//!
//! Everything here is expressed in surface-local coordinates: floating point,
//! origin at the top-left corner of the grid surface. Pointer input reported
//! in the screen frame is translated before it reaches this module (see
//! [`CoordinateFrame`](crate::event::CoordinateFrame)).

use std::ops::Sub;

/// Number of rows (and columns) in the lock grid.
pub const GRID_SIZE: u8 = 3;

/// Number of touch targets in the lock grid.
pub const TARGET_COUNT: usize = (GRID_SIZE as usize) * (GRID_SIZE as usize);

/// Default horizontal padding between the surface edge and the grid.
pub const DEFAULT_PADDING: f32 = 40.0;

/// Default cap on the grid's edge length.
pub const DEFAULT_MAX_GRID_WIDTH: f32 = 280.0;

/// A 2D point in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The surface origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance. Preserves ordering, so it is enough for
    /// nearest-target comparisons.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// One of the nine fixed touch targets.
///
/// `row` and `col` are in `0..3`; `index = row * 3 + col` is the identifier
/// used by patterns and events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTarget {
    row: u8,
    col: u8,
    center: Point,
}

impl GridTarget {
    /// Create a target at `(row, col)` with an explicit center.
    ///
    /// Returns `None` if either coordinate is outside the grid.
    #[must_use]
    pub fn new(row: u8, col: u8, center: Point) -> Option<Self> {
        (row < GRID_SIZE && col < GRID_SIZE).then_some(Self { row, col, center })
    }

    /// Row in `0..3`.
    #[inline]
    #[must_use]
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// Column in `0..3`.
    #[inline]
    #[must_use]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// Canonical index in `0..9`.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.row * GRID_SIZE + self.col
    }

    /// Center point in surface-local coordinates.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }
}

/// Static layout parameters from which target centers are derived.
///
/// The grid is square: its edge is the surface width minus padding on both
/// sides, capped at `max_grid_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridLayout {
    /// Width of the surface hosting the grid.
    pub surface_width: f32,
    /// Padding applied to the left and right of the grid.
    pub padding: f32,
    /// Upper bound on the grid edge length.
    pub max_grid_width: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(360.0)
    }
}

impl GridLayout {
    /// Layout for a surface of the given width with default padding and cap.
    #[must_use]
    pub const fn new(surface_width: f32) -> Self {
        Self {
            surface_width,
            padding: DEFAULT_PADDING,
            max_grid_width: DEFAULT_MAX_GRID_WIDTH,
        }
    }

    /// Set the horizontal padding.
    #[must_use]
    pub const fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Set the grid edge cap.
    #[must_use]
    pub const fn with_max_grid_width(mut self, max_grid_width: f32) -> Self {
        self.max_grid_width = max_grid_width;
        self
    }

    /// Edge length of the (square) grid. Never negative.
    #[must_use]
    pub fn grid_width(&self) -> f32 {
        (self.surface_width - 2.0 * self.padding)
            .min(self.max_grid_width)
            .max(0.0)
    }

    /// Edge length of one cell.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.grid_width() / f32::from(GRID_SIZE)
    }

    /// Detection radius as a fraction of the cell edge.
    #[must_use]
    pub fn detection_radius(&self, ratio: f32) -> f32 {
        self.cell_size() * ratio
    }

    /// Center of the cell at `(row, col)`.
    #[must_use]
    pub fn cell_center(&self, row: u8, col: u8) -> Point {
        let cell = self.cell_size();
        Point::new(
            f32::from(col) * cell + cell / 2.0,
            f32::from(row) * cell + cell / 2.0,
        )
    }

    /// Whether a surface-local point lies inside the grid square.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let edge = self.grid_width();
        point.x >= 0.0 && point.x < edge && point.y >= 0.0 && point.y < edge
    }

    /// The nine targets, ordered by index.
    #[must_use]
    pub fn targets(&self) -> [GridTarget; TARGET_COUNT] {
        std::array::from_fn(|i| {
            let row = (i / GRID_SIZE as usize) as u8;
            let col = (i % GRID_SIZE as usize) as u8;
            GridTarget {
                row,
                col,
                center: self.cell_center(row, col),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn point_sub_and_offset() {
        let p = Point::new(10.0, 20.0);
        assert_eq!(p - Point::new(4.0, 5.0), Point::new(6.0, 15.0));
        assert_eq!(p.offset(-10.0, 1.5), Point::new(0.0, 21.5));
    }

    #[test]
    fn point_from_tuple() {
        assert_eq!(Point::from((1.0, 2.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn target_rejects_out_of_range() {
        assert!(GridTarget::new(3, 0, Point::ORIGIN).is_none());
        assert!(GridTarget::new(0, 3, Point::ORIGIN).is_none());
        let t = GridTarget::new(2, 1, Point::ORIGIN).unwrap();
        assert_eq!(t.index(), 7);
    }

    #[test]
    fn default_layout_is_capped() {
        // 360 - 80 = 280, exactly at the cap.
        let layout = GridLayout::default();
        assert_eq!(layout.grid_width(), 280.0);

        let wide = GridLayout::new(1200.0);
        assert_eq!(wide.grid_width(), 280.0);
    }

    #[test]
    fn narrow_surface_shrinks_grid() {
        let layout = GridLayout::new(200.0);
        assert_eq!(layout.grid_width(), 120.0);
        assert_eq!(layout.cell_size(), 40.0);
    }

    #[test]
    fn tiny_surface_never_negative() {
        let layout = GridLayout::new(10.0);
        assert_eq!(layout.grid_width(), 0.0);
        assert_eq!(layout.cell_size(), 0.0);
    }

    #[test]
    fn targets_are_indexed_row_major() {
        let layout = GridLayout::new(200.0).with_padding(10.0).with_max_grid_width(300.0);
        assert_eq!(layout.cell_size(), 60.0);

        let targets = layout.targets();
        for (i, t) in targets.iter().enumerate() {
            assert_eq!(usize::from(t.index()), i);
            assert_eq!(t.row(), i as u8 / 3);
            assert_eq!(t.col(), i as u8 % 3);
        }
        assert_eq!(targets[0].center(), Point::new(30.0, 30.0));
        assert_eq!(targets[4].center(), Point::new(90.0, 90.0));
        assert_eq!(targets[5].center(), Point::new(150.0, 90.0));
        assert_eq!(targets[8].center(), Point::new(150.0, 150.0));
    }

    #[test]
    fn detection_radius_scales_with_cell() {
        let layout = GridLayout::new(200.0).with_padding(10.0);
        assert_eq!(layout.detection_radius(0.5), 30.0);
    }

    #[test]
    fn contains_is_half_open() {
        let layout = GridLayout::new(200.0).with_padding(10.0);
        assert!(layout.contains(Point::ORIGIN));
        assert!(layout.contains(Point::new(179.9, 179.9)));
        assert!(!layout.contains(Point::new(180.0, 10.0)));
        assert!(!layout.contains(Point::new(-0.1, 10.0)));
    }
}
