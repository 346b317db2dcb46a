//! Property tests for the text and tree passes.

#![allow(clippy::tests_outside_test_module)]

use lq_pipeline::{OptimizingTransformer, QueryContext, remove_unmatched_parens, rewrite_tree};
use lq_query::{Item, parse};
use proptest::prelude::*;

/// Text with balanced brackets of every tracked kind.
fn balanced_strategy() -> impl Strategy<Value = String> {
    let leaf = "[a-z ]{0,6}".prop_map(String::from);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| format!("({s})")),
            inner.clone().prop_map(|s| format!("<{s}>")),
            (inner.clone(), any::<bool>(), any::<bool>()).prop_map(|(s, l, r)| format!(
                "{}{s}{}",
                if l { '[' } else { '{' },
                if r { ']' } else { '}' }
            )),
            prop::collection::vec(inner, 1..4).prop_map(|parts| parts.concat()),
        ]
    })
}

/// Queries with nested groups, boosts and operators.
fn query_strategy() -> impl Strategy<Value = String> {
    let word = "[a-z]{1,6}".prop_filter("reserved word", |w| w != "to");
    word.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|ws| format!("({})", ws.join(" "))),
            inner.clone().prop_map(|s| format!("+{s}")),
            inner.clone().prop_map(|s| format!("-{s}")),
            (inner, prop_oneof![Just("1"), Just("2"), Just("0.5")])
                .prop_map(|(s, b)| format!("{s}^{b}")),
        ]
    })
}

fn optimize(tree: Item) -> Option<Item> {
    rewrite_tree(&OptimizingTransformer, tree, &mut QueryContext::default())
}

/// Returns true if no group has a plain group as a direct child.
fn is_flat(item: &Item) -> bool {
    let nested = matches!(item, Item::Group(operands)
        if operands.iter().any(|o| matches!(o, Item::Group(_))));
    !nested && item.children().into_iter().all(is_flat)
}

proptest! {
    #[test]
    fn balanced_text_is_unchanged(text in balanced_strategy()) {
        prop_assert_eq!(remove_unmatched_parens(&text), text);
    }

    #[test]
    fn unmatched_removal_is_idempotent(text in "[a-z()\\[\\]{}<> ]{0,24}") {
        let once = remove_unmatched_parens(&text);
        prop_assert_eq!(remove_unmatched_parens(&once), once.clone());
    }

    #[test]
    fn optimizing_is_idempotent(query in query_strategy()) {
        let tree = parse(&query).unwrap().unwrap();
        let once = optimize(tree);
        let twice = once.clone().and_then(optimize);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn optimized_groups_are_flat(query in query_strategy()) {
        let tree = parse(&query).unwrap().unwrap();
        if let Some(optimized) = optimize(tree) {
            prop_assert!(is_flat(&optimized));
        }
    }
}
