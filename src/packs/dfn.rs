//! `dfn` pack (spec.md §6): infix arrow `vars >$> body` as function
//! shorthand — the inverse order of `fn[params][body]`'s brackets, built
//! directly on the `>$>` binary operator already registered in
//! `tree::kind` rather than a bracket pair.

use std::rc::Rc;

use crate::expand::MacroRegistry;
use crate::packs::{as_parameter_list, function_literal};
use crate::tree::Node;

pub fn register(registry: &mut MacroRegistry) {
    let pattern = Node::new(">$>", [Node::leaf("_"), Node::leaf("_")]);
    registry.register(
        pattern,
        Rc::new(|captures| {
            let params = as_parameter_list(&captures[0]);
            Some(function_literal(params, captures[1].clone()))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::serialize;

    #[test]
    fn arrow_lowers_to_function_literal() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let vars = Node::new(",", [Node::leaf("x"), Node::leaf("y")]);
        let body = Node::new("+", [Node::leaf("x"), Node::leaf("y")]);
        let tree = Node::new(">$>", [vars, body]);
        let out = registry.expand(&tree);
        assert_eq!(out.data(), "function");
        let text = serialize(&out);
        assert!(text.starts_with("function ("));
    }

    #[test]
    fn single_var_is_one_parameter() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = Node::new(">$>", [Node::leaf("x"), Node::leaf("x")]);
        let out = registry.expand(&tree);
        assert_eq!(out.children()[0].child_count(), 1);
    }
}
