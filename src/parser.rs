//! The three-pass operator-precedence parser (spec.md §4.4): fold the
//! lexer's ribbon into a tree using its `fold_index`, stitch the
//! remaining statement chain back together with inferred semicolons,
//! then clean up the redundant nesting left behind by invocation
//! reclassification.

use crate::error::Error;
use crate::lexer::{self, LexOutput};
use crate::tree::{kind, Assoc, Node, NodeId, RibbonArena, Role};

/// Lex and parse `src`, returning the single root node of the resulting
/// immutable tree (spec.md §4.4 "root discovery").
pub fn parse(src: &str) -> Result<Node, Error> {
    let lexed = lexer::lex(src)?;
    Ok(parse_ribbon(lexed))
}

/// Runs Passes A, B and C over an already-lexed ribbon and freezes the
/// result.
pub fn parse_ribbon(mut lexed: LexOutput) -> Node {
    let invocations = pass_a_fold_operators(&mut lexed.arena, &mut lexed.fold_index);
    pass_b_infer_semicolons(&mut lexed.arena);
    pass_c_invocation_cleanup(&mut lexed.arena, &invocations);

    match lexed.arena.children(lexed.root).first() {
        Some(&top) => lexed.arena.freeze(top),
        None => Node::leaf(""),
    }
}

// ---- Pass A: operator folding -----------------------------------------

fn pass_a_fold_operators(arena: &mut RibbonArena, fold_index: &mut [Vec<NodeId>]) -> Vec<NodeId> {
    let mut invocations = Vec::new();
    for group in 0..kind::group_count() {
        let mut candidates = std::mem::take(&mut fold_index[group]);
        if kind::group_assoc(group) == Assoc::Right {
            candidates.reverse();
        }
        for n in candidates {
            dispatch(arena, n, &mut invocations);
        }
    }
    invocations
}

fn dispatch(arena: &mut RibbonArena, n: NodeId, invocations: &mut Vec<NodeId>) {
    let data = arena.data(n).to_string();
    let role = match kind::role_of(&data) {
        Some(r) => r,
        None => return,
    };

    // "Do not fold a keyword if its right sibling is `:`" (spec.md §4.4):
    // guards object-literal keys that happen to spell a keyword.
    if matches!(role, Role::GrabUntilBlock | Role::OptionalRightFold) {
        if let Some(next) = arena.next(n) {
            if arena.data(next) == ":" {
                return;
            }
        }
    }

    match role {
        Role::Binary => {
            let _ = arena.fold_left(n);
            let _ = arena.fold_right(n);
        }
        Role::PrefixUnary => {
            let _ = arena.fold_right(n);
        }
        Role::PostfixUnary => {
            let _ = arena.fold_left(n);
        }
        Role::AmbiguousBracket => {
            if let Some(inv) = reclassify_bracket(arena, n) {
                invocations.push(inv);
            }
        }
        Role::Ternary => fold_ternary(arena, n),
        Role::GrabUntilBlock => fold_grab_until_block(arena, n, &data),
        Role::OptionalRightFold => {
            if let Some(next) = arena.next(n) {
                if arena.data(next) != ";" {
                    let _ = arena.fold_right(n);
                }
            }
        }
    }
}

/// Reclassify an ambiguous `(`/`[` into an invocation/dereference node
/// when its left sibling is a valid callee: a `.` node, or any node that
/// is neither an operator nor a value-disallowing keyword. Returns the
/// new compound node's id when reclassified, `None` when the bracket is
/// left as a plain grouping/array-literal node.
fn reclassify_bracket(arena: &mut RibbonArena, bracket: NodeId) -> Option<NodeId> {
    let opener = arena.data(bracket).to_string();
    let eligible = match arena.prev(bracket) {
        None => false,
        Some(left) => {
            let ldata = arena.data(left);
            ldata == "." || (!kind::is_operator(ldata) && !kind::disallows_value_position(ldata))
        }
    };
    if !eligible {
        return None;
    }
    let compound = if opener == "(" { "()" } else { "[]" };
    let outer = arena.wrap(bracket, compound);
    if arena.fold_left(outer).is_ok() {
        arena.swap_children(outer, 0, 1);
    }
    Some(outer)
}

/// `fold_left`, `fold_right`, then absorb the consequent/alternate split
/// on `:` directly (spec.md §4.4's ternary swap restated without the
/// original's two-step fold-then-swap, since it produces the same
/// `[condition, consequent, alternate]` shape more directly — see
/// DESIGN.md).
fn fold_ternary(arena: &mut RibbonArena, n: NodeId) {
    let _ = arena.fold_left(n);
    let _ = arena.fold_right(n);
    if let Some(next) = arena.next(n) {
        if arena.data(next) == ":" {
            arena.unlink(next);
            let _ = arena.fold_right(n);
        }
    }
}

fn fold_grab_until_block(arena: &mut RibbonArena, n: NodeId, construct: &str) {
    let max_prefix = kind::grab_prefix_max(construct);
    let mut absorbed = 0;
    while absorbed < max_prefix {
        match arena.next(n) {
            Some(next) if !matches!(arena.data(next), "{" | ";") => {
                if arena.fold_right(n).is_err() {
                    break;
                }
                absorbed += 1;
            }
            _ => break,
        }
    }
    if let Some(next) = arena.next(n) {
        if matches!(arena.data(next), "{" | ";") {
            let _ = arena.fold_right(n);
        }
    }
    if let Some(continuation) = kind::continuation_for(construct) {
        if let Some(next) = arena.next(n) {
            if arena.data(next) == continuation {
                let _ = arena.fold_right(n);
            }
        }
    }
}

// ---- Pass B: inferred semicolons ---------------------------------------

/// Any node still carrying a `next` once operator folding is done is
/// wrapped in an `i;` node that absorbs its right side, restoring a
/// single-rooted tree (spec.md §4.4, §9: walked in reverse creation
/// order).
fn pass_b_infer_semicolons(arena: &mut RibbonArena) {
    for id in arena.all_ids_reverse().collect::<Vec<_>>() {
        if arena.next(id).is_some() {
            let wrapped = arena.wrap(id, "i;");
            let _ = arena.fold_right(wrapped);
        }
    }
}

// ---- Pass C: invocation cleanup -----------------------------------------

/// An invocation/dereference node after Pass A has the shape
/// `()[callee, group]`, where `group` is the original bracket node
/// wrapping the real argument-list root. Replace `group` with its sole
/// child so the invocation directly owns the argument list. An
/// empty-argument call (`f()`, `a.b()`) folds `group` with zero children;
/// there is no argument-list root to hoist, so the invocation is left
/// owning just the callee — the serializer treats a missing second child
/// as "no arguments" (spec.md §4.8).
fn pass_c_invocation_cleanup(arena: &mut RibbonArena, invocations: &[NodeId]) {
    for &inv in invocations {
        let children = arena.children(inv).to_vec();
        if children.len() != 2 {
            continue;
        }
        let (callee, group) = (children[0], children[1]);
        let group_children = arena.children(group).to_vec();
        match group_children.len() {
            0 => arena.replace_children(inv, vec![callee]),
            1 => arena.replace_children(inv, vec![callee, group_children[0]]),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize_debug(n: &Node) -> String {
        if n.children().is_empty() {
            n.data().to_string()
        } else {
            let parts: Vec<String> = n.children().iter().map(serialize_debug).collect();
            format!("({} {})", n.data(), parts.join(" "))
        }
    }

    #[test]
    fn simple_binary() {
        let tree = parse("x + 1").unwrap();
        assert_eq!(serialize_debug(&tree), "(+ x 1)");
    }

    #[test]
    fn member_then_call() {
        let tree = parse("a.b()").unwrap();
        // ()[.[a, b], <empty args>]
        assert_eq!(tree.data(), "()");
        assert_eq!(tree.children()[0].data(), ".");
        assert_eq!(tree.children()[0].children()[0].data(), "a");
        assert_eq!(tree.children()[0].children()[1].data(), "b");
    }

    #[test]
    fn call_then_member() {
        let tree = parse("a().b").unwrap();
        assert_eq!(tree.data(), ".");
        assert_eq!(tree.children()[0].data(), "()");
        assert_eq!(tree.children()[0].children()[0].data(), "a");
        assert_eq!(tree.children()[1].data(), "b");
    }

    #[test]
    fn dereference_then_call_is_contextualized() {
        let tree = parse("a[0]()").unwrap();
        assert!(tree.is_contextualized_invocation());
    }

    #[test]
    fn ternary_shape() {
        let tree = parse("c ? x : y").unwrap();
        assert_eq!(tree.data(), "?");
        assert_eq!(tree.child_count(), 3);
        assert_eq!(tree.children()[0].data(), "c");
        assert_eq!(tree.children()[1].data(), "x");
        assert_eq!(tree.children()[2].data(), "y");
    }

    #[test]
    fn if_else_grabs_continuation() {
        let tree = parse("if (c) { a } else { b }").unwrap();
        assert_eq!(tree.data(), "if");
        // [condition-group, block, else-node]
        let last = tree.children().last().unwrap();
        assert_eq!(last.data(), "else");
    }

    #[test]
    fn function_grabs_name_params_and_block() {
        let tree = parse("function f(x) {return x}").unwrap();
        assert_eq!(tree.data(), "function");
        assert_eq!(tree.children()[0].data(), "f");
        assert_eq!(tree.children()[1].data(), "(");
        assert_eq!(tree.children()[2].data(), "{");
    }

    #[test]
    fn inferred_semicolon_joins_statements() {
        let tree = parse("if (c) {a} next_stmt()").unwrap();
        assert_eq!(tree.data(), "i;");
        assert_eq!(tree.children()[0].data(), "if");
        assert_eq!(tree.children()[1].data(), "()");
    }

    #[test]
    fn flatten_collapses_comma_chain() {
        let tree = parse("a, b, c").unwrap();
        let flat = tree.flatten();
        assert_eq!(flat.child_count(), 3);
    }

    #[test]
    fn regex_literal_not_division() {
        // A braceless `if` body is never absorbed by grab-until-block (it
        // only consumes `{`/`;`), so this becomes `i;[if(condition),
        // call]` — what matters here is that `/foo/` lexed as a regex,
        // not that it nests under `if`.
        let tree = parse("if (condition) /foo/.test(x)").unwrap();
        let mut found_regex = false;
        tree.reach(&mut |n| {
            if n.is_regex() {
                found_regex = true;
            }
        });
        assert!(found_regex, "{}", serialize_debug(&tree));
    }

    #[test]
    fn numeric_dereference_then_invocation() {
        let tree = parse("0.5.toString()").unwrap();
        assert_eq!(tree.data(), "()");
        let deref = &tree.children()[0];
        assert_eq!(deref.data(), ".");
        assert!(deref.children()[0].is_number());
    }
}
