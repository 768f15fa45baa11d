#![allow(missing_docs, reason = "Docs aren't be necessary for tests.")]
#![allow(
    clippy::tests_outside_test_module,
    reason = "This is an integration-test. This is a false-positive by clippy, see https://github.com/rust-lang/rust-clippy/issues/11024"
)]

use agglomerative_clustering::*;
use itertools::Itertools as _;
use proptest::prelude::*;

fn linkage() -> impl Strategy<Value = Linkage> {
    prop_oneof![
        Just(Linkage::Single),
        Just(Linkage::Complete),
        Just(Linkage::Average),
    ]
}

/// Points together with a valid cluster count for them.
fn points_and_k() -> impl Strategy<Value = (Vec<Point>, usize)> {
    prop::collection::vec((-50.0..50.0_f64, -50.0..50.0_f64), 1..14).prop_flat_map(|coords| {
        let n = coords.len();
        let (xs, ys): (Vec<f64>, Vec<f64>) = coords.into_iter().unzip();
        let points = points_2d(&xs, &ys).expect("unzip yields equal lengths");
        (Just(points), 1..=n)
    })
}

proptest! {
    #[test]
    fn fit_partitions_into_k_clusters((points, k) in points_and_k(), linkage in linkage()) {
        let table = DistanceTable::euclidean(&points).expect("All points are two-dimensional.");
        let clusters = table.fit(linkage, k).expect("The table is valid.");
        let clusters = clusters.expect("k is a valid cluster count.");

        prop_assert_eq!(clusters.len(), k);
        prop_assert!(clusters.iter().all(|cluster| !cluster.is_empty()));
        let members = clusters.iter().flat_map(Cluster::iter).sorted().collect_vec();
        prop_assert_eq!(members, (0..points.len()).collect_vec());
        prop_assert!(clusters.iter().tuple_windows().all(|(a, b)| a < b), "Clusters come in table order.");
    }

    #[test]
    fn hierarchy_levels_are_nested((points, _) in points_and_k(), linkage in linkage()) {
        let table = DistanceTable::euclidean(&points).expect("All points are two-dimensional.");
        let hierarchy = table.hierarchy(linkage).expect("The table is valid.");
        prop_assert_eq!(hierarchy.len(), points.len());

        for (coarse, fine) in hierarchy.iter().tuple_windows() {
            prop_assert_eq!(coarse.len() + 1, fine.len());
            // Every cluster of the finer level lies inside some cluster of the coarser one.
            for cluster in fine {
                prop_assert!(coarse.iter().any(|parent| parent.contains(cluster)));
            }
        }
    }

    #[test]
    fn cluster_labels_are_canonical(mut indices in prop::collection::vec(0..64_usize, 1..10)) {
        let labels = indices.iter().map(|ix| format!("x{}", ix + 1)).collect_vec();
        let cluster = Cluster::from_labels(&labels).expect("Labels are well-formed.");
        indices.reverse();
        let reversed: Cluster = indices.iter().copied().collect();
        prop_assert_eq!(&cluster, &reversed);
        prop_assert_eq!(cluster.to_string().parse::<Cluster>(), Ok(cluster));
    }
}
