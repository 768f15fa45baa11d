//! Linkage strategies: how far apart two clusters are once they hold more than one point.

use core::{fmt, str::FromStr};
use rustc_hash::FxHashMap;

use crate::point::{round, PRECISION};
use crate::table::{DistanceTable, Distances};
use crate::{Cluster, Error};

/// The criterion deciding which two clusters are closest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    /// The distance between two clusters is the smallest distance between any of their points.
    Single,
    /// The distance between two clusters is the largest distance between any of their points.
    Complete,
    /// The distance between two clusters is the mean of all distances between their points,
    /// always measured on the original point-to-point distances.
    Average,
}

impl Linkage {
    /// All linkages, in declaration order.
    pub const ALL: [Self; 3] = [Self::Single, Self::Complete, Self::Average];
}

impl fmt::Display for Linkage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
        })
    }
}

impl FromStr for Linkage {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "complete" => Ok(Self::Complete),
            "average" => Ok(Self::Average),
            _ => Err(Error::UnknownLinkage(s.to_owned())),
        }
    }
}

/// What [`Strategy::recompute`] decided for one row of the table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Recomputed {
    /// The entry that survives, to be re-keyed to the merged cluster.
    pub(crate) representative: Cluster,
    /// The distance the surviving entry should carry.
    pub(crate) distance: f64,
    /// Every other entry of the row that the merged cluster absorbed.
    pub(crate) stale: Vec<Cluster>,
}

/// The original point-to-point distances, keyed by `(smaller_ix, larger_ix)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct PointDistances(FxHashMap<(usize, usize), f64>);

impl PointDistances {
    /// Snapshot an unmerged table.
    fn from_table(table: &DistanceTable) -> Result<Self, Error> {
        let mut distances = FxHashMap::default();
        for (cluster, row) in table.rows() {
            let Some(point_ix) = cluster.single_point() else {
                return Err(Error::CorruptTable(format!(
                    "average linkage needs an unmerged table, but row {cluster} holds several points"
                )));
            };
            for (target, &distance) in row {
                let Some(target_ix) = target.single_point() else {
                    return Err(Error::CorruptTable(format!(
                        "average linkage needs an unmerged table, but row {cluster} has an entry for {target}"
                    )));
                };
                distances.insert(ordered(point_ix, target_ix), distance);
            }
        }
        Ok(Self(distances))
    }

    fn get(&self, point_ix: usize, other_ix: usize) -> Result<f64, Error> {
        let (low, high) = ordered(point_ix, other_ix);
        self.0
            .get(&(low, high))
            .copied()
            .ok_or_else(|| Error::MissingDistance(Cluster::singleton(low), Cluster::singleton(high)))
    }

    /// The mean over all original distances between members of `a` and members of `b`, rounded to
    /// [`PRECISION`] decimal places.
    fn mean(&self, a: &Cluster, b: &Cluster) -> Result<f64, Error> {
        debug_assert!(
            !a.is_empty() && !b.is_empty(),
            "Averaging over an empty cluster is meaningless."
        );
        let mut sum = 0.0;
        for point_ix in a {
            for other_ix in b {
                sum += self.get(point_ix, other_ix)?;
            }
        }
        #[expect(
            clippy::as_conversions,
            clippy::cast_precision_loss,
            reason = "Cluster sizes are far below 2^52."
        )]
        let count = (a.len() * b.len()) as f64;
        Ok(round(sum / count, PRECISION))
    }
}

const fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A [`Linkage`] together with the state it needs during one fit.
#[derive(Debug, Clone)]
pub(crate) enum Strategy {
    Single,
    Complete,
    /// Average linkage keeps the distances of iteration zero for the whole fit.
    Average(PointDistances),
}

impl Strategy {
    /// Prepare a strategy for fitting `table`, which must not have been merged yet.
    pub(crate) fn new(linkage: Linkage, table: &DistanceTable) -> Result<Self, Error> {
        Ok(match linkage {
            Linkage::Single => Self::Single,
            Linkage::Complete => Self::Complete,
            Linkage::Average => Self::Average(PointDistances::from_table(table)?),
        })
    }

    /// The distance from `merged` to `target`, given the distance `kept` from the surviving half of
    /// `merged` and the distance `absorbed` from the absorbed half.
    pub(crate) fn combine(
        &self,
        merged: &Cluster,
        target: &Cluster,
        kept: f64,
        absorbed: f64,
    ) -> Result<f64, Error> {
        match self {
            Self::Single => Ok(kept.min(absorbed)),
            Self::Complete => Ok(kept.max(absorbed)),
            Self::Average(original) => original.mean(merged, target),
        }
    }

    /// Fold the row of the absorbed cluster into the row of the merged cluster.
    ///
    /// Every target present in both rows gets its combined distance in `first`. Targets only present
    /// in `first` are left alone, `second` is never modified.
    pub(crate) fn swap(
        &self,
        merged: &Cluster,
        first: &mut Distances,
        second: &Distances,
    ) -> Result<(), Error> {
        for (target, distance) in first.iter_mut() {
            if let Some(&absorbed) = second.get(target) {
                *distance = self.combine(merged, target, *distance, absorbed)?;
            }
        }
        Ok(())
    }

    /// Decide the distance from `row` to the freshly merged cluster `based`.
    ///
    /// Looks at the entries of `distances` (the targets of `row`) that `based` contains. Returns
    /// `None` if there are none, in which case the row must be left untouched. Otherwise one of them
    /// is picked as representative and all others are reported as stale.
    pub(crate) fn recompute(
        &self,
        based: &Cluster,
        row: &Cluster,
        distances: &Distances,
    ) -> Result<Option<Recomputed>, Error> {
        let mut contained = distances
            .iter()
            .filter(|(target, _)| based.contains(target));
        let Some((first_target, &first_distance)) = contained.next() else {
            return Ok(None);
        };

        let mut representative = first_target;
        let mut best = first_distance;
        let mut stale = Vec::new();
        for (target, &distance) in contained {
            let replaces = match self {
                Self::Single => distance < best,
                Self::Complete => distance > best,
                Self::Average(_) => false,
            };
            if replaces {
                stale.push(representative.clone());
                representative = target;
                best = distance;
            } else {
                stale.push(target.clone());
            }
        }

        let distance = match self {
            Self::Single | Self::Complete => best,
            Self::Average(original) => original.mean(based, row)?,
        };
        Ok(Some(Recomputed {
            representative: representative.clone(),
            distance,
            stale,
        }))
    }
}
