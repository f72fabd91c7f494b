//! The configurable front door (spec.md §6): one `Engine` owns the
//! macro registry, the symbol generator and the `qs` pack's quote
//! table, and exposes `parse`/`serialize`/`try_match`/`macro_`/`rmacro_`
//! /`macroexpand`/`compile`/`configure`, plus `Clone`.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::compile::{self, Compiled, Environment};
use crate::error::Error;
use crate::expand::{self, Expander, MacroRegistry};
use crate::packs::qs::QuoteTable;
use crate::packs::{self, dfn, fn_shorthand, qg, qs, string_interp};
use crate::parser;
use crate::pattern::{self, Captures};
use crate::serialize;
use crate::symbol::SymbolGenerator;
use crate::tree::Node;

/// `Engine` is cheap to construct and cheap to `clone`: every field is
/// a handle, not owned data, so cloning never walks a tree.
pub struct Engine {
    registry: Rc<RefCell<MacroRegistry>>,
    /// "ref" attribute (spec.md §6): shared across every clone, so
    /// fresh symbols minted by any engine sharing this handle never
    /// collide with one another.
    symbols: Rc<RefCell<SymbolGenerator>>,
    /// Shared so a `compile` call after cloning can still resolve a
    /// `qs[...]` quote recorded by the parent (or vice versa).
    quotes: QuoteTable,
    /// Which bundled packs have already been registered on *this*
    /// engine — `configure` is idempotent per engine, and this set
    /// itself follows the "shallow" clone rule: a pack configured after
    /// cloning is invisible to the other engine.
    configured: RefCell<HashSet<String>>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            registry: Rc::new(RefCell::new(MacroRegistry::new())),
            symbols: Rc::new(RefCell::new(SymbolGenerator::new("g"))),
            quotes: Rc::new(RefCell::new(std::collections::HashMap::new())),
            configured: RefCell::new(HashSet::new()),
        }
    }

    pub fn parse(&self, src: &str) -> Result<Node, Error> {
        parser::parse(src)
    }

    pub fn serialize(&self, tree: &Node) -> String {
        serialize::serialize(tree)
    }

    pub fn try_match(&self, pattern: &Node, subject: &Node) -> Option<Captures> {
        pattern::try_match(pattern, subject)
    }

    /// Register a non-recursive macro (spec.md §6 `macro`). Returns
    /// `&Self` so registrations can be chained.
    pub fn macro_(
        &self,
        pattern: Node,
        expander: impl Fn(&Captures) -> Option<Node> + 'static,
    ) -> &Self {
        self.registry.borrow_mut().register(pattern, Rc::new(expander));
        self
    }

    /// Register a recursive macro (spec.md §6 `rmacro`): the
    /// expander's own output is itself run back through `macroexpand`
    /// to a fixed point before the outer pass considers the result.
    pub fn rmacro_(
        &self,
        pattern: Node,
        expander: impl Fn(&Captures) -> Option<Node> + 'static,
    ) -> &Self {
        let inner: Expander = Rc::new(expander);
        let wrapped = expand::rmacro(Rc::clone(&self.registry), inner);
        self.registry.borrow_mut().register(pattern, wrapped);
        self
    }

    /// One pass over every currently-registered macro (spec.md §6
    /// `macroexpand`). The rules are snapshotted into an owned
    /// `MacroRegistry` *before* traversal begins and the live registry
    /// is never borrowed for the duration of the pass — this is what
    /// lets `defmacro`'s expander call `registry.borrow_mut()` to add a
    /// new rule mid-traversal without a double-borrow panic. The
    /// trade-off (documented in DESIGN.md) is that a macro registered
    /// by `defmacro` during a pass takes effect starting with the
    /// *next* `macroexpand` call, not the one that defined it.
    pub fn macroexpand(&self, tree: &Node) -> Node {
        let snapshot = self.registry.borrow().clone();
        snapshot.expand(tree)
    }

    pub fn compile<V>(&self, tree: &Node, environment: Environment<V>) -> Compiled<V> {
        compile::compile(tree, environment, &mut self.symbols.borrow_mut())
    }

    /// Activate bundled macro packs by name (spec.md §6). Unknown names
    /// are fatal (spec.md §7); already-configured packs are skipped.
    pub fn configure(&self, names: &[&str]) -> Result<&Self, Error> {
        for &name in names {
            if !packs::ALL.iter().any(|&pack| pack == name) {
                return Err(Error::UnknownConfiguration { name: name.to_string() });
            }
        }
        for &name in names {
            self.configure_one(name);
        }
        Ok(self)
    }

    fn configure_one(&self, name: &str) {
        if name == "std" {
            for sub in ["qs", "qg", "fn", "defmacro", "dfn", "string"] {
                self.configure_one(sub);
            }
            return;
        }
        if !self.configured.borrow_mut().insert(name.to_string()) {
            return;
        }
        match name {
            "qs" => qs::register(
                &mut self.registry.borrow_mut(),
                Rc::clone(&self.symbols),
                Rc::clone(&self.quotes),
            ),
            "qg" => qg::register(&mut self.registry.borrow_mut()),
            "fn" => fn_shorthand::register(&mut self.registry.borrow_mut()),
            "defmacro" => {
                crate::packs::defmacro::register(Rc::clone(&self.registry), Rc::clone(&self.symbols))
            }
            "dfn" => dfn::register(&mut self.registry.borrow_mut()),
            "string" => string_interp::register(&mut self.registry.borrow_mut()),
            _ => unreachable!("validated against packs::ALL in configure"),
        }
    }

    /// Look up the subtree a `qs[...]` site was rewritten to, keyed by
    /// the fresh symbol that replaced it.
    pub fn quoted(&self, symbol: &str) -> Option<Node> {
        self.quotes.borrow().get(symbol).cloned()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// `clone()` (spec.md §6): a new engine with shared patterns
/// copied-on-write. The macro registry and the configured-pack set are
/// "shallow" — each engine gets its own `Vec`/`HashSet` snapshotted at
/// clone time, so a macro (or pack) registered on one afterward is
/// invisible to the other (spec.md §8 invariant 8). The symbol
/// generator and quote table are "ref" — shared, so uniqueness and
/// quote lookups keep working across both engines.
impl Clone for Engine {
    fn clone(&self) -> Self {
        Engine {
            registry: Rc::new(RefCell::new(self.registry.borrow().clone())),
            symbols: Rc::clone(&self.symbols),
            quotes: Rc::clone(&self.quotes),
            configured: RefCell::new(self.configured.borrow().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serialize_round_trip() {
        let engine = Engine::new();
        let tree = engine.parse("x + 1").unwrap();
        assert_eq!(engine.serialize(&tree), "x + 1");
    }

    #[test]
    fn macro_registers_and_macroexpand_applies_it() {
        let engine = Engine::new();
        engine.macro_(Node::new("double", [Node::leaf("_")]), |caps| {
            Some(Node::new("+", [caps[0].clone(), caps[0].clone()]))
        });
        let tree = Node::new("double", [Node::leaf("x")]);
        let out = engine.macroexpand(&tree);
        assert_eq!(out, Node::new("+", [Node::leaf("x"), Node::leaf("x")]));
    }

    #[test]
    fn rmacro_reaches_a_fixed_point_per_step() {
        let engine = Engine::new();
        // countdown(n) -> n == 0 ? done : countdown(n - 1), recursively
        // re-expanded until the base case is reached.
        engine.rmacro_(Node::new("countdown", [Node::leaf("_")]), |caps| {
            let n = caps[0].as_number().unwrap_or(0.0);
            if n <= 0.0 {
                None
            } else {
                Some(Node::new("countdown", [Node::leaf((n - 1.0).to_string())]))
            }
        });
        let tree = Node::new("countdown", [Node::leaf("3")]);
        let out = engine.macroexpand(&tree);
        assert_eq!(out, Node::new("countdown", [Node::leaf("0")]));
    }

    #[test]
    fn clone_isolation() {
        let engine = Engine::new();
        engine.macro_(Node::new("a", [Node::leaf("_")]), |caps| Some(caps[0].clone()));
        let clone = engine.clone();
        engine.macro_(Node::new("b", [Node::leaf("_")]), |caps| Some(caps[0].clone()));

        let uses_a = Node::new("a", [Node::leaf("x")]);
        assert_eq!(clone.macroexpand(&uses_a), Node::leaf("x"));

        let uses_b = Node::new("b", [Node::leaf("x")]);
        assert_eq!(clone.macroexpand(&uses_b), uses_b);
        assert_eq!(engine.macroexpand(&uses_b), Node::leaf("x"));
    }

    #[test]
    fn clone_shares_fresh_symbols_without_collision() {
        let engine = Engine::new();
        let clone = engine.clone();
        let mut env_a = Environment::new();
        env_a.insert("x".to_string(), 1);
        let mut env_b = Environment::new();
        env_b.insert("x".to_string(), 2);
        let a = engine.compile(&Node::leaf("x"), env_a);
        let b = clone.compile(&Node::leaf("x"), env_b);
        assert_ne!(a.binding_symbol, b.binding_symbol);
    }

    #[test]
    fn configure_unknown_pack_is_an_error() {
        let engine = Engine::new();
        assert!(engine.configure(&["not-a-pack"]).is_err());
    }

    #[test]
    fn configure_std_activates_every_bundled_pack() {
        let engine = Engine::new();
        engine.configure(&["std"]).unwrap();
        let tree = engine.parse("fn[x][x]").unwrap();
        let out = engine.macroexpand(&tree);
        assert_eq!(out.data(), "function");
    }

    #[test]
    fn defmacro_registers_a_macro_for_a_later_pass() {
        let engine = Engine::new();
        engine.configure(&["defmacro"]).unwrap();
        let defmacro_call = engine.parse("defmacro[double(_)][_ + _]").unwrap();
        let after_first_pass = engine.macroexpand(&defmacro_call);
        assert_eq!(after_first_pass, Node::leaf("0"));

        let use_site = engine.parse("double(y)").unwrap();
        let expanded = engine.macroexpand(&use_site);
        assert_eq!(expanded, engine.parse("y + y").unwrap());
    }
}
