use std::num::NonZero;

use itertools::Itertools;
use ndarray::Ix;
use serde::{Deserialize, Serialize};

/// One coordinate of a [`Location`].
pub type Coord = i32;
pub(crate) type Dimension = NonZero<usize>;

/// A location `(x, y)` in puzzle space, as placed by the editor.
/// `x` grows to the right and `y` grows downward; both may be negative.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn offset_by(self, rhs: (Coord, Coord)) -> Self {
        Self(self.0.wrapping_add(rhs.0), self.1.wrapping_add(rhs.1))
    }
}

impl From<(Coord, Coord)> for Location {
    fn from(value: (Coord, Coord)) -> Self {
        Self(value.0, value.1)
    }
}

/// The smallest rectangle enclosing a set of [`Location`]s.
///
/// Array indices are `(row, col)` pairs, i.e. `(y, x)` relative to the minimum corner, matching the row-major layout of [`ndarray::Array2`].
/// Translating between the two is a pure offset, so [`Self::index_of`] and [`Self::location_at`] are exact inverses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Bounds {
    min: Location,
    // width, height
    dims: (Dimension, Dimension),
}

impl Bounds {
    /// Compute the bounding rectangle of `locations`, or [`None`] if there are none.
    pub fn enclosing(locations: impl IntoIterator<Item = Location> + Clone) -> Option<Self> {
        let (min_x, max_x) = locations.clone().into_iter().map(|l| l.0).minmax().into_option()?;
        let (min_y, max_y) = locations.into_iter().map(|l| l.1).minmax().into_option()?;

        let span = |min: Coord, max: Coord| {
            // at most 2^32, which fits in usize on every supported target
            let len = (i64::from(max) - i64::from(min) + 1) as usize;
            NonZero::new(len)
        };

        Some(Self {
            min: Location(min_x, min_y),
            dims: (span(min_x, max_x)?, span(min_y, max_y)?),
        })
    }

    /// The top left corner of the rectangle.
    pub fn min(&self) -> Location {
        self.min
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// Shape of the rectangle as `(rows, cols)`, suitable for [`ndarray::Array2`].
    pub fn shape(&self) -> (Ix, Ix) {
        (self.height(), self.width())
    }

    /// Number of integer points inside the rectangle.
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    /// Whether `location` lies inside the rectangle.
    pub fn contains(&self, location: Location) -> bool {
        self.index_of(location).is_some()
    }

    /// Translate a puzzle-space location into a `(row, col)` index, if it lies inside.
    pub fn index_of(&self, location: Location) -> Option<(Ix, Ix)> {
        let col = usize::try_from(i64::from(location.0) - i64::from(self.min.0)).ok()?;
        let row = usize::try_from(i64::from(location.1) - i64::from(self.min.1)).ok()?;

        (col < self.width() && row < self.height()).then_some((row, col))
    }

    /// Translate a `(row, col)` index back into puzzle space.
    ///
    /// Only meaningful for indices inside [`Self::shape`].
    pub fn location_at(&self, index: (Ix, Ix)) -> Location {
        let (row, col) = index;
        Location(
            (i64::from(self.min.0) + col as i64) as Coord,
            (i64::from(self.min.1) + row as i64) as Coord,
        )
    }

    /// Every location inside the rectangle in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.height())
            .cartesian_product(0..self.width())
            .map(|index| self.location_at(index))
    }
}
