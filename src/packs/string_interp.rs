//! `string` pack (spec.md §6): literal strings containing `#{expr}` are
//! lowered to a flattened additive concatenation of the literal parts
//! and the parsed expressions. Registered under the wildcard pattern
//! `_` — it must see every node, since `data` equality can't select
//! "any string literal" the way `try_match` works — and declines (one
//! of spec.md §7's normal, non-error outcomes) for anything that isn't
//! a string or doesn't contain `#{`.

use std::rc::Rc;

use crate::expand::MacroRegistry;
use crate::parser;
use crate::tree::Node;

pub fn register(registry: &mut MacroRegistry) {
    let pattern = Node::leaf("_");
    registry.register(pattern, Rc::new(|captures| interpolate(&captures[0])));
}

fn interpolate(subject: &Node) -> Option<Node> {
    if !subject.is_string() {
        return None;
    }
    let raw = subject.data();
    if raw.len() < 2 {
        return None;
    }
    let quote = raw.chars().next().unwrap();
    let inner = &raw[1..raw.len() - 1];
    if !inner.contains("#{") {
        return None;
    }

    let mut parts: Vec<(bool, Node)> = Vec::new();
    let bytes = inner.as_bytes();
    let mut lit_start = 0usize;
    let mut i = 0usize;
    while i < inner.len() {
        if bytes[i] == b'#' && i + 1 < inner.len() && bytes[i + 1] == b'{' {
            if i > lit_start {
                parts.push((false, literal_node(quote, &inner[lit_start..i])));
            }
            let expr_start = i + 2;
            let mut depth = 1i32;
            let mut j = expr_start;
            while j < inner.len() && depth > 0 {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            let expr_src = &inner[expr_start..j];
            let expr_tree = parser::parse(expr_src).unwrap_or_else(|_| Node::leaf("undefined"));
            parts.push((true, expr_tree));
            i = j + 1;
            lit_start = i;
        } else {
            i += 1;
        }
    }
    if lit_start < inner.len() {
        parts.push((false, literal_node(quote, &inner[lit_start..])));
    }

    // An interpolated expression can never be the first or last operand
    // (spec.md §8: the parsed expression lands as an interior element,
    // bracketed by literal parts) -- pad with an empty literal on
    // whichever end would otherwise start or end with one.
    if parts.first().is_some_and(|(is_expr, _)| *is_expr) {
        parts.insert(0, (false, literal_node(quote, "")));
    }
    if parts.last().is_some_and(|(is_expr, _)| *is_expr) {
        parts.push((false, literal_node(quote, "")));
    }

    let nodes: Vec<Node> = parts.into_iter().map(|(_, n)| n).collect();
    if nodes.len() == 1 {
        return Some(nodes.into_iter().next().unwrap());
    }
    Some(Node::new("+", nodes))
}

fn literal_node(quote: char, text: &str) -> Node {
    Node::leaf(format!("{quote}{text}{quote}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn splices_a_single_interpolation() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = parse(r#""hello #{name}""#).unwrap();
        let out = registry.expand(&tree);
        assert_eq!(out.data(), "+");
        assert_eq!(out.child_count(), 3);
        assert_eq!(out.children()[0].data(), "\"hello \"");
        assert_eq!(out.children()[1].data(), "name");
        assert_eq!(out.children()[2].data(), "\"\"");
    }

    #[test]
    fn non_interpolated_strings_are_untouched() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = Node::leaf("\"plain\"");
        let out = registry.expand(&tree);
        assert_eq!(out, tree);
    }

    #[test]
    fn interpolation_at_both_ends() {
        let mut registry = MacroRegistry::new();
        register(&mut registry);
        let tree = parse(r#""#{a} and #{b}""#).unwrap();
        let out = registry.expand(&tree);
        assert_eq!(out.data(), "+");
        assert_eq!(out.child_count(), 5);
        assert_eq!(out.children()[0].data(), "\"\"");
        assert_eq!(out.children()[1].data(), "a");
        assert_eq!(out.children()[2].data(), "\" and \"");
        assert_eq!(out.children()[3].data(), "b");
        assert_eq!(out.children()[4].data(), "\"\"");
    }
}
