// Property tests for the diff engine.
// The generators always produce well-formed datasets (no id classified
// twice), matching what the analyzer hands the engine.

use diff_metrics::{diff_dataset, diff_dataset_maps, Dataset, DatasetMap, FunctionId};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn function_id() -> impl Strategy<Value = FunctionId> {
    ("[a-z]{1,5}(::[a-z]{1,5})?", "[a-z_]{1,8}")
        .prop_map(|(module, function)| FunctionId::new(module, function))
}

/// A dataset with unique ids, each classified exactly once.
fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::btree_set(function_id(), 0..12)
        .prop_flat_map(|ids| {
            let ids: Vec<FunctionId> = ids.into_iter().collect();
            let len = ids.len();
            (Just(ids), prop::collection::vec(any::<bool>(), len))
        })
        .prop_map(|(ids, instrumented_mask)| {
            let mut result = Dataset::default();
            for (id, instrumented) in ids.into_iter().zip(instrumented_mask) {
                if instrumented {
                    result.instrumented.push(id);
                } else {
                    result.uninstrumented.push(id);
                }
            }
            result
        })
}

fn dataset_map() -> impl Strategy<Value = DatasetMap> {
    prop::collection::btree_map("[a-z./]{1,6}", dataset(), 0..4)
}

fn key_set(ids: &[FunctionId]) -> BTreeSet<FunctionId> {
    ids.iter().cloned().collect()
}

proptest! {
    #[test]
    fn empty_base_classifies_everything_as_added(head in dataset()) {
        let diff = diff_dataset(&head, &Dataset::default());
        prop_assert_eq!(&diff.added_instrumented, &head.instrumented);
        prop_assert_eq!(&diff.added_uninstrumented, &head.uninstrumented);
        prop_assert!(diff.newly_instrumented.is_empty());
        prop_assert!(diff.no_longer_instrumented.is_empty());
        prop_assert!(diff.deleted.is_empty());
        prop_assert_eq!(diff.coverage_ratio_delta, None);
    }

    #[test]
    fn empty_head_classifies_everything_as_deleted(base in dataset()) {
        let diff = diff_dataset(&Dataset::default(), &base);
        let mut expected = key_set(&base.instrumented);
        expected.extend(base.uninstrumented.iter().cloned());
        prop_assert_eq!(key_set(&diff.deleted), expected);
        prop_assert!(diff.added_instrumented.is_empty());
        prop_assert!(diff.added_uninstrumented.is_empty());
        prop_assert!(diff.newly_instrumented.is_empty());
        prop_assert!(diff.no_longer_instrumented.is_empty());
        prop_assert_eq!(diff.coverage_ratio_delta, None);
    }

    #[test]
    fn deletions_mirror_additions_of_the_reversed_diff(head in dataset(), base in dataset()) {
        let forward = diff_dataset(&head, &base);
        let backward = diff_dataset(&base, &head);
        let mut backward_added = key_set(&backward.added_instrumented);
        backward_added.extend(backward.added_uninstrumented.iter().cloned());
        prop_assert_eq!(key_set(&forward.deleted), backward_added);
    }

    #[test]
    fn diff_buckets_are_pairwise_disjoint(head in dataset(), base in dataset()) {
        let diff = diff_dataset(&head, &base);
        let buckets = [
            &diff.newly_instrumented,
            &diff.no_longer_instrumented,
            &diff.added_instrumented,
            &diff.added_uninstrumented,
            &diff.deleted,
        ];
        let total: usize = buckets.iter().map(|bucket| bucket.len()).sum();
        let mut all = BTreeSet::new();
        for bucket in buckets {
            all.extend(bucket.iter().cloned());
        }
        prop_assert_eq!(all.len(), total);
    }

    #[test]
    fn map_diff_covers_exactly_the_union_of_roots(head in dataset_map(), base in dataset_map()) {
        let diff = diff_dataset_maps(&head, &base);
        let expected: BTreeSet<&String> = head.keys().chain(base.keys()).collect();
        let actual: BTreeSet<&String> = diff.keys().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn map_diff_is_deterministic(head in dataset_map(), base in dataset_map()) {
        prop_assert_eq!(
            diff_dataset_maps(&head, &base),
            diff_dataset_maps(&head, &base)
        );
    }

    #[test]
    fn coverage_delta_is_defined_iff_both_sides_have_functions(head in dataset(), base in dataset()) {
        let diff = diff_dataset(&head, &base);
        prop_assert_eq!(
            diff.coverage_ratio_delta.is_some(),
            !head.is_empty() && !base.is_empty()
        );
        if let Some(delta) = diff.coverage_ratio_delta {
            prop_assert!(delta.is_finite());
            prop_assert!((-1.0..=1.0).contains(&delta));
        }
    }
}
