//! `qs[<expr>]` — quotation (spec.md §6): lowers to the already-parsed
//! tree of `<expr>` (the surrounding parse already built it), recorded
//! under a fresh symbol rather than spliced back in place, so a later
//! runtime `compile` step can inject the captured tree by name instead
//! of re-serializing it inline.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::expand::MacroRegistry;
use crate::symbol::SymbolGenerator;
use crate::tree::Node;

/// Maps each fresh symbol a `qs[...]` site was rewritten to, back to
/// the quoted subtree it stands for.
pub type QuoteTable = Rc<RefCell<HashMap<String, Node>>>;

pub fn register(registry: &mut MacroRegistry, symbols: Rc<RefCell<SymbolGenerator>>, quotes: QuoteTable) {
    let pattern = Node::new("[]", [Node::leaf("qs"), Node::leaf("_")]);
    registry.register(
        pattern,
        Rc::new(move |captures| {
            let symbol = symbols.borrow_mut().fresh();
            quotes.borrow_mut().insert(symbol.clone(), captures[0].clone());
            Some(Node::leaf(symbol))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_quoted_tree_under_a_fresh_symbol() {
        let mut registry = MacroRegistry::new();
        let symbols = Rc::new(RefCell::new(SymbolGenerator::new("q")));
        let quotes: QuoteTable = Rc::new(RefCell::new(HashMap::new()));
        register(&mut registry, symbols, quotes.clone());

        let quoted = Node::new("+", [Node::leaf("x"), Node::leaf("1")]);
        let tree = Node::new("[]", [Node::leaf("qs"), quoted.clone()]);
        let out = registry.expand(&tree);

        assert_eq!(out.child_count(), 0);
        let table = quotes.borrow();
        assert_eq!(table.get(out.data()), Some(&quoted));
    }
}
