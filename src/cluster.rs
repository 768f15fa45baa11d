//! Cluster identities.

use core::{fmt, iter, slice, str::FromStr};
use smallvec::{smallvec, SmallVec};

use crate::Error;

/// The prefix used when rendering a point-index as a label.
const LABEL_PREFIX: char = 'x';

/// A cluster of points, stored as the sorted zero-based indices of its members.
///
/// Members are kept sorted and deduplicated, so two clusters holding the same points are equal no
/// matter in which order they were built. A cluster renders as the comma-joined one-based labels of
/// its members: the cluster of the second and third point renders as `x2,x3`.
///
/// The derived ordering is lexicographic over the sorted members. Two disjoint clusters therefore
/// compare like their smallest members, which is what keeps the rows of a
/// [`DistanceTable`](crate::DistanceTable) in input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Cluster(SmallVec<[usize; 4]>);

impl Cluster {
    /// Create a new cluster containing a single point.
    #[must_use]
    #[inline]
    pub fn singleton(point_ix: usize) -> Self {
        Self(smallvec![point_ix])
    }

    /// Create a cluster from point-labels such as `x3`.
    ///
    /// Each label must end in a one-based number; any alphabetic prefix is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use agglomerative_clustering::Cluster;
    ///
    /// let cluster = Cluster::from_labels(["x7", "x3"]).unwrap();
    /// assert_eq!(cluster, Cluster::from_labels(["x3", "x7"]).unwrap());
    /// assert_eq!(cluster.to_string(), "x3,x7");
    /// ```
    #[inline]
    pub fn from_labels<I, S>(labels: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|label| parse_label(label.as_ref()))
            .collect()
    }

    /// Check whether every member of `other` is also a member of `self`.
    ///
    /// For two singletons this is plain equality.
    #[must_use]
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        // Both sides are sorted, so one forward pass over `self` suffices.
        let mut members = self.0.iter();
        other
            .0
            .iter()
            .all(|point_ix| members.any(|member| member == point_ix))
    }

    /// Check whether the cluster contains a point-index.
    #[must_use]
    #[inline]
    pub fn contains_point(&self, point_ix: usize) -> bool {
        self.0.binary_search(&point_ix).is_ok()
    }

    /// Merge the members of `other` into this cluster.
    ///
    /// Merging a cluster that is already contained is a no-op.
    #[inline]
    pub fn union_with(&mut self, other: &Self) {
        if self.contains(other) {
            return;
        }
        self.0.extend_from_slice(&other.0);
        self.0.sort_unstable();
        self.0.dedup();
    }

    /// Return the union of `self` and `other`.
    #[must_use]
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.union_with(other);
        merged
    }

    /// Check whether the cluster has exactly one member.
    #[must_use]
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.0.len() == 1
    }

    /// The only member of a singleton cluster.
    #[must_use]
    #[inline]
    pub fn single_point(&self) -> Option<usize> {
        match self.0.as_slice() {
            [point_ix] => Some(*point_ix),
            _ => None,
        }
    }

    /// Tie-break between two singletons: the smaller point-index wins.
    ///
    /// This is not an ordering. It returns `false` whenever either side has more than one member.
    #[must_use]
    #[inline]
    pub fn has_priority_over(&self, other: &Self) -> bool {
        match (self.single_point(), other.single_point()) {
            (Some(point_ix), Some(other_ix)) => point_ix < other_ix,
            _ => false,
        }
    }

    /// Count the number of points in the cluster.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the cluster doesn't contain any points.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Construct an iterator over the point-indices in the cluster, in ascending order.
    #[inline]
    pub fn iter(&self) -> iter::Copied<slice::Iter<'_, usize>> {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for Cluster {
    #[inline]
    fn from_iter<I: IntoIterator<Item = usize>>(it: I) -> Self {
        let mut members: SmallVec<[usize; 4]> = it.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self(members)
    }
}

impl<'a> IntoIterator for &'a Cluster {
    type Item = usize;
    type IntoIter = iter::Copied<slice::Iter<'a, usize>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Cluster {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, point_ix) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(",")?;
            }
            write!(f, "{LABEL_PREFIX}{}", point_ix + 1)?;
        }
        Ok(())
    }
}

impl FromStr for Cluster {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        Self::from_labels(s.split(','))
    }
}

/// Turn a one-based label such as `x12` into a zero-based point-index.
fn parse_label(label: &str) -> Result<usize, Error> {
    let malformed = || Error::MalformedLabel(label.to_owned());
    let suffix = label.trim().trim_start_matches(char::is_alphabetic);
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let number: usize = suffix.parse().map_err(|_| malformed())?;
    number.checked_sub(1).ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools as _;

    fn cluster(s: &str) -> Cluster {
        s.parse().expect("Test-labels should be well-formed.")
    }

    #[test]
    fn canonical_order() {
        let forward = Cluster::from_labels(["x2", "x10", "x3"]).expect("labels are valid");
        let backward = Cluster::from_labels(["x3", "x10", "x2"]).expect("labels are valid");
        assert_eq!(forward, backward);
        // Sorted numerically, not lexicographically.
        assert_eq!(forward.to_string(), "x2,x3,x10");
        assert_eq!(forward.iter().collect_vec(), vec![1, 2, 9]);

        for permutation in [0, 4, 7].into_iter().permutations(3) {
            assert_eq!(permutation.into_iter().collect::<Cluster>(), cluster("x1,x5,x8"));
        }
    }

    #[test]
    fn duplicates_are_dropped() {
        let cluster = Cluster::from_labels(["x4", "x4", "x1"]).expect("labels are valid");
        assert_eq!(cluster.len(), 2);
        assert_eq!(cluster.to_string(), "x1,x4");
    }

    #[test]
    fn single_label_is_unchanged() {
        let cluster = Cluster::from_labels(["x7"]).expect("label is valid");
        assert_eq!(cluster, Cluster::singleton(6));
        assert!(cluster.is_singleton());
        assert_eq!(cluster.single_point(), Some(6));
        assert_eq!(cluster.to_string(), "x7");
    }

    #[test]
    fn malformed_labels() {
        for label in ["x", "xy", "x0", "x-1", "x1.5", ""] {
            assert_eq!(
                Cluster::from_labels([label]),
                Err(Error::MalformedLabel(label.to_owned())),
                "{label:?} should be rejected"
            );
        }
        assert_eq!(
            "x1,,x2".parse::<Cluster>(),
            Err(Error::MalformedLabel(String::new()))
        );
        // Other alphabetic prefixes are accepted.
        assert_eq!(cluster("p3"), Cluster::singleton(2));
        assert_eq!(cluster("point3"), Cluster::singleton(2));
    }

    #[test]
    fn containment() {
        let big = cluster("x2,x3,x4");
        assert!(big.contains(&cluster("x3")));
        assert!(big.contains(&cluster("x2,x4")));
        assert!(big.contains(&big));
        assert!(!big.contains(&cluster("x1")));
        assert!(!big.contains(&cluster("x3,x5")));
        assert!(!cluster("x3").contains(&big));

        // Between singletons, containment is equality.
        assert!(cluster("x3").contains(&cluster("x3")));
        assert!(!cluster("x3").contains(&cluster("x4")));

        assert!(big.contains_point(2));
        assert!(!big.contains_point(0));
    }

    #[test]
    fn union() {
        let mut merged = cluster("x5");
        merged.union_with(&cluster("x2,x3"));
        assert_eq!(merged, cluster("x2,x3,x5"));

        let before = merged.clone();
        merged.union_with(&cluster("x3"));
        assert_eq!(merged, before, "Adding a contained cluster should be a no-op.");

        assert_eq!(cluster("x1,x4").union(&cluster("x4,x6")), cluster("x1,x4,x6"));
    }

    #[test]
    fn priority() {
        assert!(cluster("x2").has_priority_over(&cluster("x9")));
        assert!(!cluster("x9").has_priority_over(&cluster("x2")));
        assert!(!cluster("x2").has_priority_over(&cluster("x2")));
        // Only defined between singletons.
        assert!(!cluster("x1,x2").has_priority_over(&cluster("x9")));
        assert!(!cluster("x1").has_priority_over(&cluster("x8,x9")));
    }

    #[test]
    fn ordering_follows_smallest_member() {
        let sorted = [cluster("x1,x7"), cluster("x2"), cluster("x3,x4,x5"), cluster("x6")];
        assert!(sorted.iter().tuple_windows().all(|(a, b)| a < b));
    }

    #[test]
    fn display_round_trip() {
        let cluster = cluster("x1,x2,x3,x4,x5,x6,x7,x8,x9,x10");
        assert_eq!(cluster.to_string().parse::<Cluster>(), Ok(cluster));
        assert_eq!("".parse::<Cluster>(), Ok(Cluster::default()));
        assert!(Cluster::default().is_empty());
    }
}
