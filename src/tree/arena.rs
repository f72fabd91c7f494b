//! The mutable "ribbon" arena used only during lexing and parsing
//! (spec.md §3, §9). An arena of node records addressed by index, rather
//! than a graph of reference-counted cells with cycles: the doubly-linked
//! sibling chain becomes plain index assignments, so nothing here needs
//! `Rc`/`Weak` or unsafe cycle-breaking.
//!
//! Once parsing finishes (parser.rs Pass C), [`RibbonArena::freeze`]
//! transposes the reachable subtree under the root into the immutable
//! [`crate::tree::Node`] representation used by every later stage.

use smol_str::SmolStr;

use crate::tree::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug)]
struct Record {
    data: SmolStr,
    children: Vec<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    parent: Option<NodeId>,
}

/// The mutable doubly-linked sibling chain produced by the lexer.
#[derive(Debug, Default)]
pub struct RibbonArena {
    records: Vec<Record>,
}

impl RibbonArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construction from `data`, with no children and no links: the raw
    /// material `append_sibling` and the lexer's grouping stack attach
    /// into the ribbon.
    pub fn push(&mut self, data: impl Into<SmolStr>) -> NodeId {
        let id = NodeId(self.records.len() as u32);
        self.records.push(Record {
            data: data.into(),
            children: Vec::new(),
            prev: None,
            next: None,
            parent: None,
        });
        id
    }

    pub fn data(&self, id: NodeId) -> &str {
        &self.records[id.0 as usize].data
    }

    pub fn set_data(&mut self, id: NodeId, data: impl Into<SmolStr>) {
        self.records[id.0 as usize].data = data.into();
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.records[id.0 as usize].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.records[id.0 as usize].parent
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.records[id.0 as usize].prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.records[id.0 as usize].next
    }

    fn rec(&self, id: NodeId) -> &Record {
        &self.records[id.0 as usize]
    }

    fn rec_mut(&mut self, id: NodeId) -> &mut Record {
        &mut self.records[id.0 as usize]
    }

    /// Replace `parent`'s single head-of-chain child. Group nodes created
    /// while lexing have at most one child: the head of their inner
    /// ribbon.
    fn set_head_child(&mut self, parent: NodeId, child: NodeId) {
        let rec = self.rec_mut(parent);
        if rec.children.is_empty() {
            rec.children.push(child);
        } else {
            rec.children[0] = child;
        }
    }

    /// Append a brand new leaf node as the next sibling of `after`,
    /// inheriting its parent scope.
    pub fn append_sibling(&mut self, after: NodeId, data: impl Into<SmolStr>) -> NodeId {
        let parent = self.rec(after).parent;
        let old_next = self.rec(after).next;
        let new = self.push(data);
        {
            let rec = self.rec_mut(new);
            rec.prev = Some(after);
            rec.next = old_next;
            rec.parent = parent;
        }
        self.rec_mut(after).next = Some(new);
        if let Some(n) = old_next {
            self.rec_mut(n).prev = Some(new);
        }
        new
    }

    /// Start a new, empty group scope as the next sibling of `after` (or
    /// as the sole content of `parent` if `after` is `None`): used by the
    /// lexer when it meets a group opener. Returns the new group node;
    /// its own `children` stays empty until the first token inside it is
    /// appended with [`Self::append_first_child`].
    pub fn append_group(
        &mut self,
        after: Option<NodeId>,
        parent: Option<NodeId>,
        data: impl Into<SmolStr>,
    ) -> NodeId {
        match after {
            Some(after) => self.append_sibling(after, data),
            None => {
                let new = self.push(data);
                if let Some(p) = parent {
                    self.rec_mut(new).parent = Some(p);
                    self.set_head_child(p, new);
                }
                new
            }
        }
    }

    /// First token appended inside an empty group scope.
    pub fn append_first_child(&mut self, parent: NodeId, data: impl Into<SmolStr>) -> NodeId {
        let new = self.push(data);
        self.rec_mut(new).parent = Some(parent);
        self.set_head_child(parent, new);
        new
    }

    /// Splice `id` out of its sibling chain and clear its own links too,
    /// so it is inert: neither a neighbor of its old siblings nor a
    /// candidate for any later pass that scans for dangling `next`
    /// pointers (e.g. the inferred-semicolon pass).
    pub fn unlink(&mut self, id: NodeId) {
        let prev = self.rec(id).prev;
        let next = self.rec(id).next;
        let parent = self.rec(id).parent;
        if let Some(p) = prev {
            self.rec_mut(p).next = next;
        } else if let Some(par) = parent {
            if let Some(n) = next {
                self.set_head_child(par, n);
            }
        }
        if let Some(n) = next {
            self.rec_mut(n).prev = prev;
        }
        let rec = self.rec_mut(id);
        rec.prev = None;
        rec.next = None;
        rec.parent = None;
    }

    /// Consume the left sibling of `n` as its new (rightmost) child,
    /// splicing `n` into the left sibling's former ribbon position.
    pub fn fold_left(&mut self, n: NodeId) -> Result<(), ()> {
        let left = self.rec(n).prev.ok_or(())?;
        let left_prev = self.rec(left).prev;
        let parent = self.rec(left).parent;
        self.rec_mut(n).prev = left_prev;
        if let Some(lp) = left_prev {
            self.rec_mut(lp).next = Some(n);
        } else if let Some(par) = parent {
            self.set_head_child(par, n);
        }
        self.rec_mut(left).parent = Some(n);
        self.rec_mut(left).prev = None;
        self.rec_mut(left).next = None;
        self.rec_mut(n).children.push(left);
        Ok(())
    }

    /// Consume the right sibling of `n` as its new (rightmost) child.
    pub fn fold_right(&mut self, n: NodeId) -> Result<(), ()> {
        let right = self.rec(n).next.ok_or(())?;
        let right_next = self.rec(right).next;
        self.rec_mut(n).next = right_next;
        if let Some(rn) = right_next {
            self.rec_mut(rn).prev = Some(n);
        }
        self.rec_mut(right).parent = Some(n);
        self.rec_mut(right).prev = None;
        self.rec_mut(right).next = None;
        self.rec_mut(n).children.push(right);
        Ok(())
    }

    /// Replace `n` in the ribbon with a freshly created `outer` node,
    /// reparenting `n` as `outer`'s sole child.
    pub fn wrap(&mut self, n: NodeId, outer_data: impl Into<SmolStr>) -> NodeId {
        let prev = self.rec(n).prev;
        let next = self.rec(n).next;
        let parent = self.rec(n).parent;
        let outer = self.push(outer_data);
        {
            let rec = self.rec_mut(outer);
            rec.prev = prev;
            rec.next = next;
            rec.parent = parent;
            rec.children.push(n);
        }
        if let Some(p) = prev {
            self.rec_mut(p).next = Some(outer);
        } else if let Some(par) = parent {
            self.set_head_child(par, outer);
        }
        if let Some(nx) = next {
            self.rec_mut(nx).prev = Some(outer);
        }
        self.rec_mut(n).parent = Some(outer);
        self.rec_mut(n).prev = None;
        self.rec_mut(n).next = None;
        outer
    }

    pub fn reparent(&mut self, child: NodeId, parent: NodeId) {
        self.rec_mut(child).parent = Some(parent);
    }

    /// Append `child` directly to `node`'s children list, without
    /// touching the ribbon (used by the parser's Pass C cleanup, which
    /// operates purely on `children`, not on sibling links).
    pub fn push_child(&mut self, node: NodeId, child: NodeId) {
        self.rec_mut(node).children.push(child);
        self.rec_mut(child).parent = Some(node);
    }

    pub fn replace_children(&mut self, node: NodeId, children: Vec<NodeId>) {
        for &c in &children {
            self.rec_mut(c).parent = Some(node);
        }
        self.rec_mut(node).children = children;
    }

    pub fn swap_children(&mut self, node: NodeId, a: usize, b: usize) {
        self.rec_mut(node).children.swap(a, b);
    }

    /// All node ids, from most- to least-recently created. Pass B
    /// (inferred semicolons, spec.md §4.4) walks nodes in this order.
    pub fn all_ids_reverse(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        (0..self.records.len() as u32).map(NodeId).rev()
    }

    /// Ascend `parent` links until none remain.
    pub fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(p) = self.rec(id).parent {
            id = p;
        }
        id
    }

    /// Transpose the subtree rooted at `root` into the immutable
    /// [`Node`] representation, clearing ribbon links in the process
    /// (spec.md §4.2: "after parsing completes, prev/next/parent are
    /// logically cleared").
    pub fn freeze(&self, root: NodeId) -> Node {
        self.freeze_rec(root)
    }

    fn freeze_rec(&self, id: NodeId) -> Node {
        let rec = self.rec(id);
        let children: Vec<Node> = rec.children.iter().map(|&c| self.freeze_rec(c)).collect();
        Node::new(rec.data.clone(), children)
    }
}
