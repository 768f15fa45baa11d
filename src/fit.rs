//! The merge loop.

use tracing::{debug, trace, warn};

use crate::linkage::{Linkage, Strategy};
use crate::table::DistanceTable;
use crate::{Cluster, Error};

impl DistanceTable {
    /// Cluster the table into exactly `k` clusters.
    ///
    /// Starting with one cluster per row, the closest two clusters (as decided by `linkage`) are
    /// merged until `k` clusters remain. The table itself is left untouched.
    ///
    /// Returns `Ok(None)` unless `1 <= k <= self.len()`. Errors only occur if the table is
    /// inconsistent, which can't happen for tables built by this crate.
    ///
    /// # Examples
    ///
    /// ```
    /// use agglomerative_clustering::{points_1d, DistanceTable, Linkage};
    ///
    /// let table = DistanceTable::euclidean(&points_1d(&[0.0, 0.1, 5.0])).unwrap();
    /// let clusters = table.fit(Linkage::Single, 2).unwrap().unwrap();
    /// assert_eq!(clusters[0].to_string(), "x1,x2");
    /// assert_eq!(clusters[1].to_string(), "x3");
    ///
    /// assert_eq!(table.fit(Linkage::Single, 0), Ok(None));
    /// assert_eq!(table.fit(Linkage::Single, 4), Ok(None));
    /// ```
    #[inline]
    pub fn fit(&self, linkage: Linkage, k: usize) -> Result<Option<Vec<Cluster>>, Error> {
        if k == 0 || k > self.len() {
            return Ok(None);
        }
        let strategy = Strategy::new(linkage, self)?;
        let mut table = self.clone();
        while table.len() > k {
            merge_closest(&mut table, &strategy)?;
        }
        Ok(Some(table.into_clusters()))
    }

    /// Calculate the clusterings for every `k` at once.
    ///
    /// For the returned vector, `vec[k - 1]` holds the same clustering as
    /// [`fit(linkage, k)`](DistanceTable::fit). The levels are built by a single run of the merge
    /// loop, so each level arises from the one below it by merging two clusters.
    #[inline]
    pub fn hierarchy(&self, linkage: Linkage) -> Result<Vec<Vec<Cluster>>, Error> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let strategy = Strategy::new(linkage, self)?;
        let mut table = self.clone();
        let mut levels = vec![table.clusters().cloned().collect::<Vec<_>>()];
        while table.len() > 1 {
            merge_closest(&mut table, &strategy)?;
            levels.push(table.clusters().cloned().collect());
        }
        levels.reverse();
        Ok(levels)
    }
}

/// Cluster points into exactly `k` clusters.
///
/// This builds a [`DistanceTable`] with [`DistanceTable::from_points`] and calls
/// [`DistanceTable::fit`] on it.
///
/// # Examples
///
/// ```
/// use agglomerative_clustering::{fit, Linkage};
///
/// let clusters = fit(&[0.0, 4.0, 4.5, 9.0], |p: &f64, q: &f64| (p - q).abs(), Linkage::Complete, 3)
///     .unwrap()
///     .unwrap();
/// let rendered: Vec<String> = clusters.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, ["x1", "x2,x3", "x4"]);
/// ```
#[inline]
pub fn fit<P>(
    points: &[P],
    distance: impl Fn(&P, &P) -> f64,
    linkage: Linkage,
    k: usize,
) -> Result<Option<Vec<Cluster>>, Error> {
    DistanceTable::from_points(points, distance).fit(linkage, k)
}

/// Merge the closest pair of clusters, reducing the table by exactly one row.
fn merge_closest(table: &mut DistanceTable, strategy: &Strategy) -> Result<(), Error> {
    let rows_before = table.len();
    let Some((first, second, distance)) = table
        .best_pair()
        .map(|(first, second, distance)| (first.clone(), second.clone(), distance))
    else {
        return Err(Error::CorruptTable(format!(
            "no pair left to merge among {rows_before} rows"
        )));
    };
    debug!(%first, %second, distance, "merging closest clusters");

    let mut first_row = table.remove_row(&first)?;
    let second_row = table.remove_row(&second)?;
    first_row.remove(&second);
    let merged = first.union(&second);
    strategy.swap(&merged, &mut first_row, &second_row)?;
    table.insert_row(merged.clone(), first_row);

    recompute_distances(table, &merged, strategy)?;

    let dropped = table.clear_last_row();
    if !dropped.is_empty() {
        warn!(
            entries = dropped.len(),
            "last row of the distance table was not empty after merging"
        );
    }

    debug_assert_eq!(
        table.len(),
        rows_before - 1,
        "Every merge should remove exactly one row."
    );
    trace!("distance table after merging {merged}:\n{table}");
    Ok(())
}

/// Bring every row's distance to the freshly merged cluster up to date.
///
/// Rows before the merged row get their entries for its parts replaced by a single entry for
/// `merged`. Rows after it can only hold an entry for the absorbed cluster; that distance moves into
/// the merged row, so each pair stays stored exactly once.
fn recompute_distances(
    table: &mut DistanceTable,
    merged: &Cluster,
    strategy: &Strategy,
) -> Result<(), Error> {
    let mut moved = Vec::new();
    for (cluster, distances) in table.rows_mut() {
        if cluster == merged {
            continue;
        }
        let Some(recomputed) = strategy.recompute(merged, cluster, distances)? else {
            continue;
        };
        for stale in &recomputed.stale {
            distances.remove(stale);
        }
        distances.remove(&recomputed.representative);
        if cluster < merged {
            distances.insert(merged.clone(), recomputed.distance);
        } else {
            moved.push((cluster.clone(), recomputed.distance));
        }
    }

    if moved.is_empty() {
        return Ok(());
    }
    let merged_row = table.row_mut(merged)?;
    for (cluster, absorbed) in moved {
        let kept = merged_row
            .get(&cluster)
            .copied()
            .ok_or_else(|| Error::MissingDistance(merged.clone(), cluster.clone()))?;
        let distance = strategy.combine(merged, &cluster, kept, absorbed)?;
        merged_row.insert(cluster, distance);
    }
    Ok(())
}
