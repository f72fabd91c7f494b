//! Macro expansion (spec.md §4.6): a registry of `(pattern, expander)`
//! pairs tried in registration order at every node, via the tree's
//! cutoff-respecting `rmap`.

use std::rc::Rc;

use crate::pattern::{self, Captures};
use crate::tree::Node;

/// An expander receives the captures bound by its pattern, in traversal
/// order, and either returns a replacement node or declines (`None`),
/// in which case the next registered pattern for that node is tried.
/// `Rc`, not `Box`: `Engine::clone` shallow-copies the registry's `Vec`
/// (spec.md §6 "shallow") while letting both engines keep running the
/// same built-in pack closures without re-registering them.
pub type Expander = Rc<dyn Fn(&Captures) -> Option<Node>>;

#[derive(Clone, Default)]
pub struct MacroRegistry {
    rules: Vec<(Node, Expander)>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `(pattern, expander)` pair. Later registrations are
    /// tried only if every earlier one declines at a given node.
    pub fn register(&mut self, pattern: Node, expander: Expander) {
        self.rules.push((pattern, expander));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One pass over `tree`: at each node, in registration order, try
    /// matching and invoking each rule's expander on the first match.
    /// A successful (non-`None`) expansion replaces the node and Node's
    /// `rmap` does not descend into the replacement — expansion is
    /// **not** a fixed point. Recursive expansion is the caller's
    /// responsibility (see `rmacro` below).
    pub fn expand(&self, tree: &Node) -> Node {
        let f = move |n: &Node| -> Option<Node> {
            for (pattern, expander) in &self.rules {
                if let Some(captures) = pattern::try_match(pattern, n) {
                    if let Some(replacement) = expander(&captures) {
                        return Some(replacement);
                    }
                }
            }
            None
        };
        tree.rmap(&f)
    }
}

/// Wraps an expander so its output is itself run back through `expand`
/// with `registry`, giving that one rule fixed-point recursion without
/// making expansion globally fixed-point (spec.md §4.6, §8 invariant 7,
/// §6's `defmacro`/`dfn` "rmacro" wrapper). `registry` is a shared
/// handle to the registry this very rule is registered in, so it is
/// read only once the rule's expander runs, not at registration time.
pub fn rmacro(registry: Rc<std::cell::RefCell<MacroRegistry>>, inner: Expander) -> Expander {
    Rc::new(move |captures: &Captures| {
        inner(captures).map(|out| {
            // Snapshot before traversing, not `registry.borrow().expand(&out)`
            // directly: the latter would hold a live borrow for the whole
            // traversal, so a `defmacro` rule anywhere in `out` calling
            // `registry.borrow_mut()` to register itself would panic.
            let snapshot = registry.borrow().clone();
            snapshot.expand(&out)
        })
    })
}
