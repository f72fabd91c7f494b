//! The immutable, rooted tree form used by every consumer downstream of
//! the parser (spec.md §3, §4.2). Plain `Rc` sharing gives us exactly the
//! semantics spec.md §5 asks for — "subtrees are immutable for
//! consumers; macro expansion produces new root nodes rather than
//! mutating" — for free: cloning a `Node` is a refcount bump, and a
//! rewrite that keeps most of a tree shares the untouched subtrees with
//! the original.

use std::cell::Cell;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::tree::kind::{self, Role};

#[derive(Debug)]
struct NodeData {
    data: SmolStr,
    children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Node(Rc<NodeData>);

/// Allows `Node::new("+", ["x", "1"])` — bare string children are
/// auto-wrapped as leaves, per spec.md §4.2.
pub trait IntoChild {
    fn into_child(self) -> Node;
}

impl IntoChild for Node {
    fn into_child(self) -> Node {
        self
    }
}

impl IntoChild for &Node {
    fn into_child(self) -> Node {
        self.clone()
    }
}

impl IntoChild for &str {
    fn into_child(self) -> Node {
        Node::leaf(self)
    }
}

impl IntoChild for String {
    fn into_child(self) -> Node {
        Node::leaf(self)
    }
}

impl Node {
    pub fn leaf(data: impl Into<SmolStr>) -> Node {
        Node(Rc::new(NodeData { data: data.into(), children: Vec::new() }))
    }

    pub fn new<D, C, I>(data: D, children: I) -> Node
    where
        D: Into<SmolStr>,
        C: IntoChild,
        I: IntoIterator<Item = C>,
    {
        let children = children.into_iter().map(IntoChild::into_child).collect();
        Node(Rc::new(NodeData { data: data.into(), children }))
    }

    pub fn data(&self) -> &str {
        &self.0.data
    }

    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    pub fn child_count(&self) -> usize {
        self.0.children.len()
    }

    fn same(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ---- tree primitives (spec.md §4.2) --------------------------------

    /// Append a child. Panics are reserved for index-based operations;
    /// this one cannot go out of range.
    pub fn push_child(&self, child: impl IntoChild) -> Node {
        let mut children = self.0.children.clone();
        children.push(child.into_child());
        Node::new(self.data().to_string(), children)
    }

    /// Remove the last child.
    ///
    /// # Panics
    /// Panics if the node has no children (spec.md §4.2: "invalid-index
    /// mutations must panic").
    pub fn pop_child(&self) -> Node {
        let mut children = self.0.children.clone();
        children.pop().unwrap_or_else(|| panic!("pop_child on a childless node"));
        Node::new(self.data().to_string(), children)
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn replace_child(&self, index: usize, node: impl IntoChild) -> Node {
        let mut children = self.0.children.clone();
        if index >= children.len() {
            panic!("replace_child index {index} out of range (len {})", children.len());
        }
        children[index] = node.into_child();
        Node::new(self.data().to_string(), children)
    }

    // ---- traversal ------------------------------------------------------

    /// Side-effecting shallow traversal over direct children.
    pub fn each(&self, mut f: impl FnMut(&Node)) {
        for c in self.children() {
            f(c);
        }
    }

    /// Shallow map: returns a new node with direct children replaced by
    /// `f`, itself not recursive.
    pub fn map(&self, mut f: impl FnMut(&Node) -> Node) -> Node {
        let children: Vec<Node> = self.children().iter().map(|c| f(c)).collect();
        Node::new(self.data().to_string(), children)
    }

    /// Non-consing recursive traversal: visits every descendant
    /// depth-first without building a new tree.
    pub fn reach(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for c in self.children() {
            c.reach(f);
        }
    }

    /// Recursive map with cutoff (spec.md §4.2): `f(node)` is tried
    /// first. If it returns a node distinct from `node`, that node
    /// replaces the subtree and recursion does **not** descend into it.
    /// If it returns `node` itself or `None`, recursion descends into
    /// the (possibly-substituted) children and reparents automatically.
    pub fn rmap(&self, f: &dyn Fn(&Node) -> Option<Node>) -> Node {
        if let Some(replacement) = f(self) {
            if !self.same(&replacement) {
                return replacement;
            }
        }
        let children: Vec<Node> = self.children().iter().map(|c| c.rmap(f)).collect();
        Node::new(self.data().to_string(), children)
    }

    /// `rmap` that replaces each leaf whose `data` equals `data_key`
    /// with the next entry of `replacements`, cycling modulo its length.
    /// A single-element `replacements` replaces every occurrence
    /// uniformly. Never mutates `self`.
    pub fn substitute(&self, data_key: &str, replacements: &[Node]) -> Node {
        if replacements.is_empty() {
            return self.clone();
        }
        let counter = Cell::new(0usize);
        let f = move |n: &Node| -> Option<Node> {
            if n.child_count() == 0 && n.data() == data_key {
                let i = counter.get();
                counter.set(i + 1);
                Some(replacements[i % replacements.len()].clone())
            } else {
                None
            }
        };
        self.rmap(&f)
    }

    /// Collapse a chain of the same left-/right-associative binary
    /// operator into one variadic node with operands in left-to-right
    /// source order. Both associativity directions converge on the same
    /// result (spec.md §9 open question, resolved in SPEC_FULL.md).
    pub fn flatten(&self) -> Node {
        let op = self.data().to_string();
        let is_binary_chain_op =
            matches!(kind::role_of(&op), Some(Role::Binary)) && self.child_count() == 2;
        if !is_binary_chain_op {
            return self.clone();
        }
        let mut operands = Vec::new();
        fn collect(n: &Node, op: &str, out: &mut Vec<Node>) {
            if n.data() == op && n.child_count() == 2 && matches!(kind::role_of(op), Some(Role::Binary))
            {
                collect(&n.children()[0], op, out);
                collect(&n.children()[1], op, out);
            } else {
                out.push(n.clone());
            }
        }
        collect(self, &op, &mut operands);
        Node::new(op, operands)
    }

    // ---- predicates (spec.md §4.2) -------------------------------------

    pub fn is_string(&self) -> bool {
        self.child_count() == 0 && self.data().starts_with('"')
    }

    pub fn is_number(&self) -> bool {
        if self.child_count() != 0 {
            return false;
        }
        let d = self.data();
        let mut chars = d.chars();
        match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.child_count() == 0 && matches!(self.data(), "true" | "false")
    }

    pub fn is_regex(&self) -> bool {
        self.child_count() == 0 && self.data().starts_with('/')
    }

    /// A brace-delimited group node.
    pub fn is_block(&self) -> bool {
        self.data() == "{"
    }

    pub fn has_grouped_block(&self) -> bool {
        self.children().iter().any(Node::is_block)
    }

    pub fn is_invocation(&self) -> bool {
        self.data() == "()"
    }

    pub fn is_dereference(&self) -> bool {
        self.data() == "[]"
    }

    /// An invocation whose callee is itself a dereference — cannot be
    /// eta-reduced.
    pub fn is_contextualized_invocation(&self) -> bool {
        self.is_invocation() && self.children().first().is_some_and(Node::is_dereference)
    }

    pub fn is_constant(&self) -> bool {
        self.is_string() || self.is_number() || self.is_boolean() || self.is_regex()
    }

    pub fn as_number(&self) -> Option<f64> {
        if !self.is_number() {
            return None;
        }
        let d = self.data();
        if let Some(hex) = d.strip_prefix("0x").or_else(|| d.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16).ok().map(|v| v as f64);
        }
        if d.len() > 1 && d.starts_with('0') && d.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            return i64::from_str_radix(&d[1..], 8).ok().map(|v| v as f64);
        }
        d.parse::<f64>().ok()
    }

    pub fn as_unescaped_string(&self) -> Option<String> {
        if !self.is_string() {
            return None;
        }
        let inner = &self.data()[1..self.data().len().saturating_sub(1)];
        Some(unescape(inner))
    }

    /// Returns `(source, flags)` with delimiters stripped.
    pub fn as_unescaped_regex(&self) -> Option<(String, String)> {
        if !self.is_regex() {
            return None;
        }
        let d = self.data();
        let rest = &d[1..];
        let end = rest.rfind('/')?;
        let source = unescape(&rest[..end]);
        let flags = rest[end + 1..].to_string();
        Some((source, flags))
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data()
            && self.children().len() == other.children().len()
            && self.children().iter().zip(other.children()).all(|(a, b)| a == b)
    }
}

impl Eq for Node {}
