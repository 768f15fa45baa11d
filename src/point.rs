//! Points and the distance-functions used to build a [`DistanceTable`](crate::DistanceTable).
//!
//! Distances are rounded to [`PRECISION`] decimal places, so that tables (and therefore
//! tie-breaks during clustering) come out the same on every platform.

use ndarray::{array, Array1};

use crate::Error;

/// A single point.
pub type Point = Array1<f64>;

/// The number of decimal places distances are rounded to.
pub const PRECISION: i32 = 4;

/// Round `x` to `precision` decimal places, rounding halves away from zero.
///
/// Zero and integral values are returned unchanged, as is `x` when scaling it would overflow.
///
/// # Examples
///
/// ```
/// use agglomerative_clustering::round;
///
/// assert_eq!(round(0.123_45, 4), 0.1235);
/// assert_eq!(round(-0.123_45, 4), -0.1235);
/// assert_eq!(round(2.0, 4), 2.0);
/// ```
#[must_use]
#[inline]
#[expect(clippy::float_cmp, reason = "Checking for exact integers is intended.")]
pub fn round(x: f64, precision: i32) -> f64 {
    if x == 0.0 || x == x.trunc() {
        return x;
    }
    let scale = 10_f64.powi(precision);
    let scaled = x * scale;
    if scaled.is_infinite() {
        return x;
    }
    let rounded = if x < 0.0 {
        (scaled - 0.5).ceil()
    } else {
        (scaled + 0.5).floor()
    };
    if rounded == 0.0 {
        // Avoid handing out `-0.0`.
        return 0.0;
    }
    rounded / scale
}

/// The euclidean distance between two points, rounded to [`PRECISION`] decimal places.
///
/// Both points must have the same dimension.
#[must_use]
#[inline]
pub fn euclidean(p: &Point, q: &Point) -> f64 {
    round((p - q).mapv(|x| x.powi(2)).sum().sqrt(), PRECISION)
}

/// The manhattan distance between two points, rounded to [`PRECISION`] decimal places.
///
/// Both points must have the same dimension. On one-dimensional points this agrees with
/// [`euclidean`].
#[must_use]
#[inline]
pub fn manhattan(p: &Point, q: &Point) -> f64 {
    round((p - q).mapv(f64::abs).sum(), PRECISION)
}

/// Build one-dimensional points from their coordinates.
#[must_use]
#[inline]
pub fn points_1d(xs: &[f64]) -> Vec<Point> {
    xs.iter().map(|&x| array![x]).collect()
}

/// Build two-dimensional points from separate lists of x- and y-coordinates.
///
/// # Examples
///
/// ```
/// use agglomerative_clustering::{points_2d, Error};
///
/// assert_eq!(points_2d(&[1.0, 2.0], &[3.0, 4.0]).unwrap().len(), 2);
/// assert_eq!(points_2d(&[1.0, 2.0], &[3.0]), Err(Error::LengthMismatch(2, 1)));
/// ```
#[inline]
pub fn points_2d(xs: &[f64], ys: &[f64]) -> Result<Vec<Point>, Error> {
    if xs.len() != ys.len() {
        return Err(Error::LengthMismatch(xs.len(), ys.len()));
    }
    Ok(xs.iter().zip(ys).map(|(&x, &y)| array![x, y]).collect())
}

/// Check that all points share the same dimension.
pub(crate) fn verify_points(points: &[Point]) -> Result<&[Point], Error> {
    let Some(first_point) = points.first() else {
        return Ok(points);
    };
    let first_dim = first_point.raw_dim();

    if let Some(ix) = points.iter().position(|p| p.raw_dim() != first_dim) {
        return Err(Error::ShapeMismatch(0, ix));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::float_cmp, reason = "Rounded values should be exact.")]
    fn rounding() {
        assert_eq!(round(0.0, 4), 0.0);
        assert_eq!(round(3.0, 4), 3.0);
        assert_eq!(round(0.123_44, 4), 0.1234);
        assert_eq!(round(0.123_46, 4), 0.1235);
        assert_eq!(round(-0.123_46, 4), -0.1235);
        assert_eq!(round(1.414_213_56, 4), 1.4142);
        assert_eq!(round(1.414_213_56, 2), 1.41);
        assert!(round(-0.000_01, 4).is_sign_positive());
        assert_eq!(round(f64::MAX / 2.0, 4), f64::MAX / 2.0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "Rounded values should be exact.")]
    fn distances() {
        let points = points_1d(&[-0.3, 0.1, 2.0]);
        assert_eq!(euclidean(&points[0], &points[1]), 0.4);
        assert_eq!(euclidean(&points[1], &points[0]), 0.4);
        assert_eq!(manhattan(&points[0], &points[2]), 2.3);
        assert_eq!(euclidean(&points[0], &points[2]), 2.3);

        let points = points_2d(&[0.0, 3.0, 1.0], &[0.0, 4.0, 1.0]).expect("lengths match");
        assert_eq!(euclidean(&points[0], &points[1]), 5.0);
        assert_eq!(manhattan(&points[0], &points[1]), 7.0);
        assert_eq!(euclidean(&points[0], &points[2]), 1.4142);
        assert_eq!(euclidean(&points[2], &points[2]), 0.0);
    }

    #[test]
    fn shape_mismatch() {
        let points = vec![array![0.0, 1.0], array![1.0, 1.0], array![2.0]];
        assert_eq!(verify_points(&points), Err(Error::ShapeMismatch(0, 2)));
        assert!(verify_points(&points[..2]).is_ok());
        assert!(verify_points(&[]).is_ok());
    }
}
