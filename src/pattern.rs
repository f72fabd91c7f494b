//! Structural pattern matching with wildcards over frozen trees
//! (spec.md §4.5).

use crate::tree::Node;

/// A successful match: captured subtrees in traversal order, in the
/// order their wildcards were visited.
pub type Captures = Vec<Node>;

/// `pattern.data == "_"` matches any subject and captures it; otherwise
/// `data` and `child_count` must agree and every child pair must match
/// in turn, in source order. No backtracking: the grammar of patterns
/// is purely positional, so the first mismatch is final.
pub fn try_match(pattern: &Node, subject: &Node) -> Option<Captures> {
    if pattern.data() == "_" {
        return Some(vec![subject.clone()]);
    }
    if pattern.data() != subject.data() || pattern.child_count() != subject.child_count() {
        return None;
    }
    let mut captures = Vec::new();
    for (p, s) in pattern.children().iter().zip(subject.children()) {
        captures.extend(try_match(p, s)?);
    }
    Some(captures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_anything_and_captures() {
        let pattern = Node::leaf("_");
        let subject = Node::new("+", ["x", "1"]);
        let caps = try_match(&pattern, &subject).unwrap();
        assert_eq!(caps, vec![subject]);
    }

    #[test]
    fn structural_match_concatenates_captures_in_order() {
        let pattern = Node::new("+", [Node::leaf("_"), Node::leaf("_")]);
        let subject = Node::new("+", [Node::leaf("x"), Node::leaf("1")]);
        let caps = try_match(&pattern, &subject).unwrap();
        assert_eq!(caps, vec![Node::leaf("x"), Node::leaf("1")]);
    }

    #[test]
    fn mismatched_data_fails() {
        let pattern = Node::new("+", [Node::leaf("_"), Node::leaf("_")]);
        let subject = Node::new("-", [Node::leaf("x"), Node::leaf("1")]);
        assert!(try_match(&pattern, &subject).is_none());
    }

    #[test]
    fn mismatched_arity_fails() {
        let pattern = Node::new("+", [Node::leaf("_"), Node::leaf("_")]);
        let subject = Node::new("+", [Node::leaf("x")]);
        assert!(try_match(&pattern, &subject).is_none());
    }

    #[test]
    fn nested_wildcards_capture_depth_first() {
        let pattern = Node::new("+", [Node::new("*", [Node::leaf("_"), Node::leaf("_")]), Node::leaf("_")]);
        let subject = Node::new(
            "+",
            [Node::new("*", [Node::leaf("a"), Node::leaf("b")]), Node::leaf("c")],
        );
        let caps = try_match(&pattern, &subject).unwrap();
        assert_eq!(caps, vec![Node::leaf("a"), Node::leaf("b"), Node::leaf("c")]);
    }

    #[test]
    fn does_not_mutate_either_tree() {
        let pattern = Node::new("+", [Node::leaf("_"), Node::leaf("_")]);
        let subject = Node::new("+", [Node::leaf("x"), Node::leaf("1")]);
        let before = subject.clone();
        let _ = try_match(&pattern, &subject);
        assert_eq!(subject, before);
    }

    proptest::proptest! {
        /// spec.md §8 invariant 5: `try_match(p, s)` returns the same
        /// capture sequence on repeated calls and never mutates either
        /// tree, for arbitrary leaf data on both sides.
        #[test]
        fn match_determinism_and_non_mutation(
            op in "[a-z]{1,4}",
            left in "[a-z]{1,4}",
            right in "[a-z]{1,4}",
        ) {
            let pattern = Node::new(op.clone(), [Node::leaf("_"), Node::leaf("_")]);
            let subject = Node::new(op, [Node::leaf(left), Node::leaf(right)]);
            let before_pattern = pattern.clone();
            let before_subject = subject.clone();

            let first = try_match(&pattern, &subject);
            let second = try_match(&pattern, &subject);

            proptest::prop_assert_eq!(first, second);
            proptest::prop_assert_eq!(&pattern, &before_pattern);
            proptest::prop_assert_eq!(&subject, &before_subject);
        }
    }
}
