//! `qg[<expr>]` — grouping guard: wraps `<expr>` in explicit parentheses
//! to defeat host constant-folding (spec.md §6).

use std::rc::Rc;

use crate::expand::MacroRegistry;
use crate::tree::Node;

pub fn register(registry: &mut MacroRegistry) {
    let pattern = Node::new("[]", [Node::leaf("qg"), Node::leaf("_")]);
    registry.register(
        pattern,
        Rc::new(|captures| Some(Node::new("(", [captures[0].clone()]))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_expression_in_parens() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = Node::new("[]", [Node::leaf("qg"), Node::new("+", [Node::leaf("x"), Node::leaf("1")])]);
        let out = registry.expand(&tree);
        assert_eq!(out.data(), "(");
        assert_eq!(out.children()[0].data(), "+");
    }
}
