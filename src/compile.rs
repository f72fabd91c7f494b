//! Environment-capturing source assembly (spec.md §4.7): reroute named
//! references through a captured binding table using a fresh symbol,
//! then serialize.

use std::collections::HashMap;

use crate::serialize::serialize;
use crate::symbol::SymbolGenerator;
use crate::tree::Node;

/// Opaque host values keyed by the textual name a tree leaf may
/// reference. The engine never inspects `V`; it only threads it through
/// to the caller alongside the rewritten source.
pub type Environment<V> = HashMap<String, V>;

/// `(rewritten_source, binding_symbol, environment)`. The caller runs
/// `rewritten_source` as the body of a one-argument function named
/// `binding_symbol`, invoked with `environment`.
pub struct Compiled<V> {
    pub source: String,
    pub binding_symbol: String,
    pub environment: Environment<V>,
}

/// Every leaf whose `data` is a key of `environment` is replaced with a
/// `(B.<data>)` dereference node, `B` being one symbol fresh to this
/// call. Does not analyze which occurrences are shadowed by intervening
/// binding forms (`function` parameters, `var`) — see DESIGN.md.
pub fn compile<V>(tree: &Node, environment: Environment<V>, symbols: &mut SymbolGenerator) -> Compiled<V> {
    let binding_symbol = symbols.fresh();
    let rewritten = tree.rmap(&|n: &Node| -> Option<Node> {
        if n.child_count() == 0 && environment.contains_key(n.data()) {
            Some(Node::new(
                "(",
                [Node::new(
                    ".",
                    [Node::leaf(binding_symbol.clone()), Node::leaf(n.data().to_string())],
                )],
            ))
        } else {
            None
        }
    });
    let source = serialize(&rewritten);
    Compiled { source, binding_symbol, environment }
}
