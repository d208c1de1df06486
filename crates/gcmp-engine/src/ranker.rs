//! Orders stores by distance from the shopper.

use std::cmp::Ordering;

use gcmp_core::Store;

/// Sorts stores ascending by `distance_km`.
///
/// The sort is stable, so stores at equal distance keep their input order.
/// Stores without a distance go after every store that has one. No limit is
/// applied; see [`nearest`] for display truncation.
#[must_use]
pub fn rank(stores: &[Store]) -> Vec<Store> {
    let mut ranked = stores.to_vec();
    ranked.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));
    ranked
}

/// The first `limit` stores of the ranked order.
#[must_use]
pub fn nearest(stores: &[Store], limit: usize) -> Vec<Store> {
    let mut ranked = rank(stores);
    ranked.truncate(limit);
    ranked
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use gcmp_core::Address;

    use super::*;

    fn make_store(id: &str, distance_km: Option<f64>) -> Store {
        Store {
            id: id.to_string(),
            chain_name: "Metro".to_string(),
            store_name: format!("Metro {id}"),
            address: Address {
                street: "1 Main St".to_string(),
                city: "Toronto".to_string(),
                province: "ON".to_string(),
                postal_code: None,
            },
            distance_km,
        }
    }

    fn distances(stores: &[Store]) -> Vec<Option<f64>> {
        stores.iter().map(|s| s.distance_km).collect()
    }

    #[test]
    fn sorts_ascending_by_distance() {
        let stores = vec![
            make_store("walmart", Some(1.2)),
            make_store("loblaws", Some(0.8)),
            make_store("metro", Some(1.5)),
        ];
        let ranked = rank(&stores);
        assert_eq!(distances(&ranked), vec![Some(0.8), Some(1.2), Some(1.5)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let stores = vec![
            make_store("a", Some(2.0)),
            make_store("b", Some(1.0)),
            make_store("c", Some(2.0)),
            make_store("d", Some(1.0)),
        ];
        let ids: Vec<String> = rank(&stores).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn stores_without_distance_go_last() {
        let stores = vec![
            make_store("unknown", None),
            make_store("near", Some(0.5)),
            make_store("far", Some(9.0)),
        ];
        let ids: Vec<String> = rank(&stores).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["near", "far", "unknown"]);
    }

    #[test]
    fn output_is_a_permutation_and_non_decreasing() {
        let stores: Vec<Store> = [3.3, 0.1, 7.0, 0.1, 2.5, 9.9, 4.0]
            .iter()
            .enumerate()
            .map(|(i, d)| make_store(&i.to_string(), Some(*d)))
            .collect();
        let ranked = rank(&stores);

        assert_eq!(ranked.len(), stores.len());
        let mut in_ids: Vec<&str> = stores.iter().map(|s| s.id.as_str()).collect();
        let mut out_ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        in_ids.sort_unstable();
        out_ids.sort_unstable();
        assert_eq!(in_ids, out_ids);

        for pair in ranked.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[test]
    fn rank_imposes_no_limit() {
        let stores: Vec<Store> = (0..25)
            .map(|i| make_store(&i.to_string(), Some(f64::from(i))))
            .collect();
        assert_eq!(rank(&stores).len(), 25);
    }

    #[test]
    fn nearest_truncates_ranked_order() {
        let stores = vec![
            make_store("a", Some(3.0)),
            make_store("b", Some(1.0)),
            make_store("c", Some(2.0)),
        ];
        let ids: Vec<String> = nearest(&stores, 2).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(nearest(&stores, 10).len(), 3);
    }
}
