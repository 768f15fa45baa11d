//! The distance table clustering operates on.

use core::fmt;
use std::collections::BTreeMap;

use crate::point::{euclidean, manhattan, verify_points, Point};
use crate::{Cluster, Error};

/// The distances from one cluster to every later cluster in the table.
pub type Distances = BTreeMap<Cluster, f64>;

/// A table of distances between clusters.
///
/// Rows are kept in table order, which is the order of their smallest point. Each row maps every
/// *later* cluster to its distance, so every unordered pair of clusters is stored exactly once and
/// the last row is always empty:
///
/// ```text
/// x1 => x2:0.40 x3:0.50 x4:0.70
/// x2 => x3:0.10 x4:0.30
/// x3 => x4:0.20
/// x4 =>
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistanceTable {
    rows: BTreeMap<Cluster, Distances>,
}

impl DistanceTable {
    /// Create a table with one singleton row per point.
    ///
    /// The `i`-th point becomes the cluster `x{i+1}`. The distance-function is only ever called with
    /// the earlier point first; it should be non-negative and symmetric.
    ///
    /// # Examples
    ///
    /// ```
    /// use agglomerative_clustering::DistanceTable;
    ///
    /// let table = DistanceTable::from_points(&[0.0, 1.0, 5.0], |p: &f64, q: &f64| (p - q).abs());
    /// assert_eq!(table.len(), 3);
    /// assert_eq!(table.to_string(), "x1 => x2:1.00 x3:5.00\nx2 => x3:4.00\nx3 =>\n");
    /// ```
    #[inline]
    pub fn from_points<P>(points: &[P], distance: impl Fn(&P, &P) -> f64) -> Self {
        let rows = points
            .iter()
            .enumerate()
            .map(|(point_ix, p)| {
                let distances = points
                    .iter()
                    .enumerate()
                    .skip(point_ix + 1)
                    .map(|(other_ix, q)| (Cluster::singleton(other_ix), distance(p, q)))
                    .collect();
                (Cluster::singleton(point_ix), distances)
            })
            .collect();
        Self { rows }
    }

    /// Create a table from points using the [`euclidean`] distance.
    #[inline]
    pub fn euclidean(points: &[Point]) -> Result<Self, Error> {
        Ok(Self::from_points(verify_points(points)?, euclidean))
    }

    /// Create a table from points using the [`manhattan`] distance.
    #[inline]
    pub fn manhattan(points: &[Point]) -> Result<Self, Error> {
        Ok(Self::from_points(verify_points(points)?, manhattan))
    }

    /// Create a table from precomputed rows.
    ///
    /// Every row must be a singleton and hold a finite, non-negative distance to exactly the
    /// singletons after it. The rows may be given in any order.
    #[inline]
    pub fn from_rows<I>(rows: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (Cluster, Distances)>,
    {
        let mut table = Self::default();
        for (cluster, distances) in rows {
            if !cluster.is_singleton() {
                return Err(Error::CorruptTable(format!(
                    "row {cluster} is not a single point"
                )));
            }
            if let Some((target, distance)) = distances
                .iter()
                .find(|(_, distance)| !distance.is_finite() || distance.is_sign_negative())
            {
                return Err(Error::CorruptTable(format!(
                    "distance {distance} between {cluster} and {target} is not a finite, non-negative number"
                )));
            }
            let cluster_name = cluster.to_string();
            if table.rows.insert(cluster, distances).is_some() {
                return Err(Error::CorruptTable(format!(
                    "row {cluster_name} appears twice"
                )));
            }
        }

        let clusters: Vec<&Cluster> = table.rows.keys().collect();
        for (position, (cluster, distances)) in table.rows.iter().enumerate() {
            let later = clusters.get(position + 1..).unwrap_or_default();
            if distances.len() != later.len() || !later.iter().all(|c| distances.contains_key(*c))
            {
                return Err(Error::CorruptTable(format!(
                    "row {cluster} must hold exactly the distances to the rows after it"
                )));
            }
        }
        Ok(table)
    }

    /// The number of rows, i.e. clusters, in the table.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table has no rows.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The clusters of the table, in table order.
    #[inline]
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.rows.keys()
    }

    /// The rows of the table, in table order.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = (&Cluster, &Distances)> {
        self.rows.iter()
    }

    /// Look up the distance between two clusters of the table, in either direction.
    #[inline]
    pub fn distance(&self, a: &Cluster, b: &Cluster) -> Result<f64, Error> {
        self.rows
            .get(a)
            .and_then(|distances| distances.get(b))
            .or_else(|| self.rows.get(b).and_then(|distances| distances.get(a)))
            .copied()
            .ok_or_else(|| Error::MissingDistance(a.clone(), b.clone()))
    }

    /// Find the globally closest pair `(row, target, distance)`.
    ///
    /// Each row proposes its own closest target (see [`best_in_row`]); on a tie between rows, the
    /// row coming first in table order wins. Returns `None` if every row is empty.
    #[must_use]
    #[inline]
    pub fn best_pair(&self) -> Option<(&Cluster, &Cluster, f64)> {
        let mut best: Option<(&Cluster, &Cluster, f64)> = None;
        for (cluster, distances) in &self.rows {
            let Some((target, distance)) = best_in_row(distances) else {
                continue;
            };
            if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
                best = Some((cluster, target, distance));
            }
        }
        best
    }

    pub(crate) fn into_clusters(self) -> Vec<Cluster> {
        self.rows.into_keys().collect()
    }

    pub(crate) fn remove_row(&mut self, cluster: &Cluster) -> Result<Distances, Error> {
        self.rows
            .remove(cluster)
            .ok_or_else(|| Error::MissingRow(cluster.clone()))
    }

    pub(crate) fn insert_row(&mut self, cluster: Cluster, distances: Distances) {
        let previous = self.rows.insert(cluster, distances);
        debug_assert!(previous.is_none(), "A row should never be inserted twice.");
    }

    pub(crate) fn row_mut(&mut self, cluster: &Cluster) -> Result<&mut Distances, Error> {
        self.rows
            .get_mut(cluster)
            .ok_or_else(|| Error::MissingRow(cluster.clone()))
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = (&Cluster, &mut Distances)> {
        self.rows.iter_mut()
    }

    /// Empty the last row, returning the entries it held.
    ///
    /// Nothing comes after the last row, so it has nothing to compare itself against.
    pub(crate) fn clear_last_row(&mut self) -> Distances {
        self.rows
            .last_entry()
            .map(|mut last| core::mem::take(last.get_mut()))
            .unwrap_or_default()
    }
}

impl fmt::Display for DistanceTable {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (cluster, distances) in &self.rows {
            write!(f, "{cluster} =>")?;
            for (target, distance) in distances {
                write!(f, " {target}:{distance:.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Find the closest target of a single row.
///
/// On equal distances the target with [priority](Cluster::has_priority_over) wins, otherwise the one
/// coming first. Returns `None` for an empty row.
#[must_use]
#[inline]
pub fn best_in_row(distances: &Distances) -> Option<(&Cluster, f64)> {
    let mut best: Option<(&Cluster, f64)> = None;
    for (target, &distance) in distances {
        let replaces = match best {
            None => true,
            Some((best_target, best_distance)) => {
                distance < best_distance
                    || (distance.total_cmp(&best_distance).is_eq()
                        && target.has_priority_over(best_target))
            }
        };
        if replaces {
            best = Some((target, distance));
        }
    }
    best
}
