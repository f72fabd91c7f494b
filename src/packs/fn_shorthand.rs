//! `fn` pack (spec.md §6): function literal shorthands and trailing
//! clause sugar —
//! `fn[params][body]`, `fn_[body]`, `let[b] in e`, `e, where[b]`,
//! `e, when[c]`, `e, unless[c]`.

use std::rc::Rc;

use crate::expand::MacroRegistry;
use crate::packs::{as_parameter_list, function_literal};
use crate::tree::Node;

pub fn register(registry: &mut MacroRegistry) {
    register_fn(registry);
    register_fn_bare(registry);
    register_let_in(registry);
    register_where(registry);
    register_when(registry);
    register_unless(registry);
}

/// `fn[params][body]` parses as `[]`[`[]`[fn, params], body] (bracket
/// reclassification applies twice, once per `[...]` pair).
fn register_fn(registry: &mut MacroRegistry) {
    let pattern = Node::new(
        "[]",
        [Node::new("[]", [Node::leaf("fn"), Node::leaf("_")]), Node::leaf("_")],
    );
    registry.register(
        pattern,
        Rc::new(|captures| {
            let params = as_parameter_list(&captures[0]);
            Some(function_literal(params, captures[1].clone()))
        }),
    );
}

/// `fn_[body]` — nullary shorthand.
fn register_fn_bare(registry: &mut MacroRegistry) {
    let pattern = Node::new("[]", [Node::leaf("fn_"), Node::leaf("_")]);
    registry.register(pattern, Rc::new(|captures| Some(function_literal(Vec::new(), captures[0].clone()))));
}

/// `let[b] in e` parses as `in`[`[]`[let, b], e] — `in` is already a
/// registered binary operator, so the `let[...]` bracket folds first and
/// the surrounding `in` folds it as its left operand. `b` is expected to
/// be a single assignment `name = value`; anything else binds a fresh
/// discard name so the expansion still produces a valid call.
fn register_let_in(registry: &mut MacroRegistry) {
    let pattern = Node::new(
        "in",
        [Node::new("[]", [Node::leaf("let"), Node::leaf("_")]), Node::leaf("_")],
    );
    registry.register(
        pattern,
        Rc::new(|captures| {
            let binding = &captures[0];
            let body = captures[1].clone();
            let (name, value) = if binding.data() == "=" && binding.child_count() == 2 {
                (binding.children()[0].clone(), binding.children()[1].clone())
            } else {
                (Node::leaf("_"), binding.clone())
            };
            let callee = Node::new("(", [function_literal(vec![name], body)]);
            let args = Node::new("(", [value]);
            Some(Node::new("()", [callee, args]))
        }),
    );
}

/// `e, where[b]` — `b` runs as a leading statement, then `e` is
/// returned, both inside a freshly called nullary function so `b`
/// cannot leak bindings into the surrounding scope.
fn register_where(registry: &mut MacroRegistry) {
    let pattern = Node::new(
        ",",
        [Node::leaf("_"), Node::new("[]", [Node::leaf("where"), Node::leaf("_")])],
    );
    registry.register(
        pattern,
        Rc::new(|captures| {
            let e = captures[0].clone();
            let b = captures[1].clone();
            let body = Node::new("i;", [b, Node::new("return", [e])]);
            let callee = Node::new("(", [function_literal(Vec::new(), body)]);
            Some(Node::new("()", [callee, Node::new("(", Vec::<Node>::new())]))
        }),
    );
}

/// `e, when[c]` — `e` evaluates only if `c` is truthy; otherwise
/// `undefined`.
fn register_when(registry: &mut MacroRegistry) {
    let pattern = Node::new(
        ",",
        [Node::leaf("_"), Node::new("[]", [Node::leaf("when"), Node::leaf("_")])],
    );
    registry.register(
        pattern,
        Rc::new(|captures| {
            let e = captures[0].clone();
            let c = captures[1].clone();
            Some(Node::new("?", [c, e, Node::leaf("undefined")]))
        }),
    );
}

/// `e, unless[c]` — the negation of `when`.
fn register_unless(registry: &mut MacroRegistry) {
    let pattern = Node::new(
        ",",
        [Node::leaf("_"), Node::new("[]", [Node::leaf("unless"), Node::leaf("_")])],
    );
    registry.register(
        pattern,
        Rc::new(|captures| {
            let e = captures[0].clone();
            let c = captures[1].clone();
            Some(Node::new("?", [c, Node::leaf("undefined"), e]))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::serialize;

    #[test]
    fn fn_with_two_params_lowers_to_function_literal() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let params = Node::new(",", [Node::leaf("x"), Node::leaf("y")]);
        let body = Node::new("+", [Node::leaf("x"), Node::leaf("y")]);
        let tree = Node::new("[]", [Node::new("[]", [Node::leaf("fn"), params]), body]);
        let out = registry.expand(&tree);
        assert_eq!(out.data(), "function");
        let text = serialize(&out);
        assert!(text.starts_with("function ("));
        assert!(text.contains("return"));
    }

    #[test]
    fn fn_bare_has_no_params() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = Node::new("[]", [Node::leaf("fn_"), Node::leaf("x")]);
        let out = registry.expand(&tree);
        assert_eq!(out.children()[0].child_count(), 0);
    }

    #[test]
    fn when_lowers_to_ternary() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = Node::new(
            ",",
            [Node::leaf("e"), Node::new("[]", [Node::leaf("when"), Node::leaf("c")])],
        );
        let out = registry.expand(&tree);
        assert_eq!(out.data(), "?");
        assert_eq!(out.children()[0].data(), "c");
        assert_eq!(out.children()[1].data(), "e");
    }
}
