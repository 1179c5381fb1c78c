use crate::structs::{RankedWorkload, WorkloadResult};

/// Order results by binary clarity, highest first
///
/// The sort is stable, so equal scores keep their insertion order.
#[must_use]
pub fn rank_workloads<'a, I>(results: I) -> Vec<RankedWorkload>
where
    I: IntoIterator<Item = &'a WorkloadResult>,
{
    let mut ordered: Vec<&WorkloadResult> = results.into_iter().collect();
    ordered.sort_by(|a, b| b.binary_clarity.total_cmp(&a.binary_clarity));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, r)| RankedWorkload {
            rank: i + 1,
            workload: r.workload.clone(),
            binary_clarity: r.binary_clarity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{Cluster, ClusterStatistics, FeaturePoint};
    use proptest::prelude::*;

    fn result(name: &str, clarity: f64) -> WorkloadResult {
        let empty = |id| Cluster {
            id,
            center: FeaturePoint::default(),
            members: Vec::new(),
        };
        WorkloadResult {
            workload: name.to_string(),
            n_points: 0,
            centers: [FeaturePoint::default(); 2],
            separation: 0.0,
            areas: [0.0; 2],
            avg_area: 0.0,
            avg_spread: 0.0,
            binary_clarity: clarity,
            statistics: [ClusterStatistics::default(); 2],
            points: Vec::new(),
            labels: Vec::new(),
            clusters: [empty(0), empty(1)],
        }
    }

    #[test]
    fn test_rank_descending() {
        let results = vec![result("stable", 1.0), result("omni", 50.0), result("diverse", 3.0)];
        let ranked = rank_workloads(&results);

        let names: Vec<_> = ranked.iter().map(|r| r.workload.as_str()).collect();
        assert_eq!(names, vec!["omni", "diverse", "stable"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let results = vec![result("a", 2.0), result("b", 5.0), result("c", 2.0), result("d", 2.0)];
        let ranked = rank_workloads(&results);

        let names: Vec<_> = ranked.iter().map(|r| r.workload.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_empty() {
        assert!(rank_workloads(&Vec::<WorkloadResult>::new()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_ranking_non_increasing(scores in prop::collection::vec(0.0f64..1e9, 0..20)) {
            let results: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, &s)| result(&format!("w{i}"), s))
                .collect();
            let ranked = rank_workloads(&results);

            prop_assert_eq!(ranked.len(), results.len());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].binary_clarity >= pair[1].binary_clarity);
            }
        }
    }
}
