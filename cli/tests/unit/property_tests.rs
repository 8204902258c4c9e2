//! Property-based tests for the diff engine.
//!
//! Uses `proptest` to verify the partition invariants across random
//! desired/observed service maps.

use std::collections::BTreeSet;

use hoster_cli::domain::{ServiceMap, diff, service_map};
use hoster_common::ServiceRecord;
use proptest::prelude::*;

/// Small subdomain and commit alphabets so desired and observed overlap often.
fn services() -> impl Strategy<Value = ServiceMap> {
    proptest::collection::btree_map("[a-f]", 0u8..3, 0..6).prop_map(|entries| {
        service_map(entries.into_iter().map(|(sub, c)| {
            let commit = char::from(b'0' + c).to_string().repeat(40);
            ServiceRecord::new(sub.clone(), commit, format!("https://g/{sub}"))
        }))
    })
}

fn keys(map: &ServiceMap) -> BTreeSet<String> {
    map.keys().cloned().collect()
}

proptest! {
    /// new, changed and removed never share a subdomain.
    #[test]
    fn prop_partitions_are_disjoint(desired in services(), observed in services()) {
        let p = diff(&desired, &observed);
        let new: BTreeSet<_> = p.new.iter().map(|r| r.subdomain.clone()).collect();
        let changed: BTreeSet<_> = p.changed.iter().map(|r| r.subdomain.clone()).collect();
        let removed: BTreeSet<_> = p.removed.iter().cloned().collect();
        prop_assert!(new.is_disjoint(&changed));
        prop_assert!(new.is_disjoint(&removed));
        prop_assert!(changed.is_disjoint(&removed));
    }

    /// The union is every subdomain except those identical on both sides.
    #[test]
    fn prop_union_excludes_only_unchanged(desired in services(), observed in services()) {
        let p = diff(&desired, &observed);
        let mut union: BTreeSet<String> = p.removed.iter().cloned().collect();
        union.extend(p.to_build().iter().map(|r| r.subdomain.clone()));

        let unchanged: BTreeSet<String> = desired
            .iter()
            .filter(|(sub, rec)| observed.get(*sub).is_some_and(|o| o.last_commit == rec.last_commit))
            .map(|(sub, _)| sub.clone())
            .collect();
        let expected: BTreeSet<String> = keys(&desired)
            .union(&keys(&observed))
            .filter(|sub| !unchanged.contains(*sub))
            .cloned()
            .collect();
        prop_assert_eq!(union, expected);
    }

    /// Same inputs, same partition.
    #[test]
    fn prop_diff_is_deterministic(desired in services(), observed in services()) {
        prop_assert_eq!(diff(&desired, &observed), diff(&desired, &observed));
    }

    /// A converged region has nothing to do.
    #[test]
    fn prop_identical_maps_have_empty_diff(desired in services()) {
        prop_assert!(diff(&desired, &desired.clone()).is_empty());
    }

    /// Build records carry the desired commit.
    #[test]
    fn prop_build_uses_desired_commit(desired in services(), observed in services()) {
        let p = diff(&desired, &observed);
        for rec in p.to_build() {
            prop_assert_eq!(Some(rec), desired.get(&rec.subdomain));
        }
    }
}
