//! `defmacro` pack (spec.md §6): `defmacro[pat][tpl]` registers a new
//! macro at expansion time and lowers itself to a no-op literal;
//! `with_gensyms[vars][body]` substitutes each named variable in `body`
//! with a fresh symbol.

use std::cell::RefCell;
use std::rc::Rc;

use crate::expand::{Expander, MacroRegistry};
use crate::packs::as_parameter_list;
use crate::pattern::Captures;
use crate::symbol::SymbolGenerator;
use crate::tree::Node;

pub fn register(registry: Rc<RefCell<MacroRegistry>>, symbols: Rc<RefCell<SymbolGenerator>>) {
    register_defmacro(Rc::clone(&registry));
    register_with_gensyms(registry, symbols);
}

/// `defmacro[pat][tpl]` parses as `[]`[`[]`[defmacro, pat], tpl].
/// `pat`/`tpl` are already-parsed subtrees (the surrounding parse built
/// them); `tpl`'s own `_` leaves are positional template holes, filled
/// left-to-right by [`Node::substitute`] — the same rule spec.md §8
/// requires of `substitute` itself, reused here rather than inventing a
/// second template language. `registry` is held by the closure, not
/// just the caller: the new rule must still be visible the *next* time
/// `macroexpand` runs, after this traversal's own rule snapshot is gone
/// (see `Engine::macroexpand` — the live registry is never borrowed
/// across an entire expansion pass, precisely so this can happen
/// without a double-borrow panic).
fn register_defmacro(registry: Rc<RefCell<MacroRegistry>>) {
    let pattern = Node::new(
        "[]",
        [Node::new("[]", [Node::leaf("defmacro"), Node::leaf("_")]), Node::leaf("_")],
    );
    let target = Rc::clone(&registry);
    let expander: Expander = Rc::new(move |captures: &Captures| {
        let pat = captures[0].clone();
        let tpl = captures[1].clone();
        let rule_expander: Expander =
            Rc::new(move |inner: &Captures| Some(tpl.substitute("_", inner)));
        target.borrow_mut().register(pat, rule_expander);
        // The invocation itself contributes nothing to the expanded
        // program; a bare numeric literal is the cheapest no-op this
        // grammar can serialize.
        Some(Node::leaf("0"))
    });
    registry.borrow_mut().register(pattern, expander);
}

/// `with_gensyms[vars][body]` — each name in `vars` (a single
/// identifier or a comma list) is substituted throughout `body` by a
/// symbol fresh to this expansion, one substitution pass per name so
/// each variable gets its own symbol rather than sharing the cycling
/// behavior `substitute` uses for a single `_` key.
fn register_with_gensyms(registry: Rc<RefCell<MacroRegistry>>, symbols: Rc<RefCell<SymbolGenerator>>) {
    let pattern = Node::new(
        "[]",
        [Node::new("[]", [Node::leaf("with_gensyms"), Node::leaf("_")]), Node::leaf("_")],
    );
    let expander: Expander = Rc::new(move |captures: &Captures| {
        let vars = as_parameter_list(&captures[0]);
        let mut body = captures[1].clone();
        for var in &vars {
            let fresh = symbols.borrow_mut().fresh();
            body = body.substitute(var.data(), &[Node::leaf(fresh)]);
        }
        Some(body)
    });
    registry.borrow_mut().register(pattern, expander);
}
