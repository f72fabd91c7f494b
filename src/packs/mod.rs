//! Bundled macro packs (spec.md §6): opt-in named configurations an
//! [`crate::engine::Engine`] activates with `configure`.

pub mod defmacro;
pub mod dfn;
pub mod fn_shorthand;
pub mod qg;
pub mod qs;
pub mod string_interp;

use crate::tree::Node;

/// A comma chain flattens to its operands in source order; anything
/// else (a bare identifier, a single default-valued parameter, …) is
/// treated as a one-element parameter list. Shared by every pack that
/// lowers a bracketed `a, b, c` parameter list to a function literal.
pub(crate) fn as_parameter_list(node: &Node) -> Vec<Node> {
    if node.data() == "," {
        node.flatten().children().to_vec()
    } else {
        vec![node.clone()]
    }
}

/// `function (<params>) { return <body> }` — the literal shape every
/// shorthand pack (`fn`, `dfn`, `let`/`where`) lowers to. A real
/// `function f(x, y)` parse keeps a multi-parameter list as a single `,`
/// node inside the `(` group (the group-opener serializer joins its own
/// children with a bare space, not `, `); mirror that shape here rather
/// than spreading `params` directly as the group's children, or a
/// pack-generated `(x, y)` would serialize as `(x y)`.
pub(crate) fn function_literal(params: Vec<Node>, body: Node) -> Node {
    let param_list = match params.len() {
        0 => Node::new("(", Vec::<Node>::new()),
        1 => Node::new("(", [params.into_iter().next().unwrap()]),
        _ => Node::new("(", [Node::new(",", params)]),
    };
    Node::new("function", [param_list, Node::new("{", [Node::new("return", [body])])])
}

/// The name every pack registers under with `Engine::configure`.
pub const ALL: &[&str] = &["qs", "qg", "fn", "defmacro", "dfn", "string", "std"];
