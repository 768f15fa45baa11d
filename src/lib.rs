/*!
Bottom-up [hierarchical clustering](https://en.wikipedia.org/wiki/Hierarchical_clustering) of a
finite set of points.

Every point starts out in its own cluster. The two closest clusters are merged until `k` clusters
remain. What "closest" means is decided by the [`Linkage`]:
- [`Linkage::Single`]: the smallest distance between any two points of the clusters.
- [`Linkage::Complete`]: the largest distance between any two points of the clusters.
- [`Linkage::Average`]: the mean over all distances between points of the clusters.

Points are opaque: a [`DistanceTable`] is built from any slice of points and a distance-function,
and clustering only ever looks at that table. For [`ndarray`]-points, [`euclidean`] and [`manhattan`]
distances are provided. They round to four decimal places, which makes ties (and with them the
order of merges) reproducible across platforms.

Ties are broken deterministically: within a row, the target with the smaller point-label wins;
between rows, the row coming first in the table wins.

# Example

```
use agglomerative_clustering::{points_1d, DistanceTable, Linkage};

let points = points_1d(&[-0.3, 0.1, 0.2, 0.4, 1.6, 1.7, 1.9, 2.0]);
let table = DistanceTable::euclidean(&points).unwrap();

// Clusters are rendered as the comma-joined one-based labels of their points.
let clusters = table.fit(Linkage::Single, 4).unwrap().expect("4 is a valid cluster count");
let rendered: Vec<String> = clusters.iter().map(ToString::to_string).collect();
assert_eq!(rendered, ["x1", "x2,x3,x4", "x5,x6", "x7,x8"]);

// All levels at once, `hierarchy[k - 1]` holding `k` clusters.
let hierarchy = table.hierarchy(Linkage::Single).unwrap();
assert_eq!(hierarchy[3], clusters);
assert_eq!(hierarchy[0][0].to_string(), "x1,x2,x3,x4,x5,x6,x7,x8");
```
*/

#![expect(
    clippy::missing_errors_doc,
    reason = "The Error-Enum is sparse and documented."
)]

mod cluster;
mod fit;
mod linkage;
mod point;
mod table;

pub use cluster::Cluster;
pub use fit::fit;
pub use linkage::Linkage;
pub use point::{euclidean, manhattan, points_1d, points_2d, round, Point, PRECISION};
pub use table::{best_in_row, DistanceTable, Distances};

/// An error-type for building tables and clustering them.
///
/// An invalid number of clusters is not an error, see [`DistanceTable::fit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A point-label (the offending label is included) has no one-based numeric suffix.
    #[error("malformed point label {0:?}, expected a one-based number such as `x3`")]
    MalformedLabel(String),
    /// A linkage-name (included) is none of `single`, `complete` or `average`.
    #[error("unknown linkage {0:?}, expected `single`, `complete` or `average`")]
    UnknownLinkage(String),
    /// Two points (specified by their indices in the points-slice) have different dimensions.
    #[error("points {0} and {1} have different dimensions")]
    ShapeMismatch(usize, usize),
    /// The x- and y-coordinates of two-dimensional points have different lengths.
    #[error("got {0} x-coordinates but {1} y-coordinates")]
    LengthMismatch(usize, usize),
    /// The table holds no distance between two clusters that should both be in it.
    #[error("distance table has no distance between {0} and {1}")]
    MissingDistance(Cluster, Cluster),
    /// The table holds no row for a cluster that should be in it.
    #[error("distance table has no row for {0}")]
    MissingRow(Cluster),
    /// The table is malformed, e.g. its rows don't form an upper triangle.
    #[error("invalid distance table: {0}")]
    CorruptTable(String),
}
