//! Static token classification tables (spec.md §3).
//!
//! Every table here is a pure function of a token's `data` string, built
//! once behind `once_cell::sync::Lazy` the way the rest of this codebase's
//! ancestry (rust-analyzer-descended syntax-tree crates) keeps its keyword
//! and operator sets: a `HashSet`/`HashMap` computed once, looked up many
//! times, never mutated after construction.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// The syntactic role a token plays once the parser has decided what to
/// do with it. Roles are purely a function of `data`; nodes do not carry
/// a separate tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Binary,
    PrefixUnary,
    PostfixUnary,
    /// Ambiguous `(`/`[` before reclassification into invocation/dereference.
    AmbiguousBracket,
    Ternary,
    GrabUntilBlock,
    OptionalRightFold,
}

/// Fold direction within a precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

struct Group {
    assoc: Assoc,
    /// `(token, role)` pairs. A group can mix roles — member access (`.`)
    /// and call/subscript (`(`, `[`) share one precedence tier and must
    /// be processed in true left-to-right source order, not as two
    /// separately-ordered passes, or chains like `a.b()` and `a().b`
    /// fold in the wrong order (see DESIGN.md).
    entries: &'static [(&'static str, Role)],
}

/// Precedence groups ordered highest to lowest. Position in this list is
/// a token's reduce index (spec.md §3).
static GROUPS: &[Group] = &[
    Group {
        assoc: Assoc::Left,
        entries: &[
            (".", Role::Binary),
            ("(", Role::AmbiguousBracket),
            ("[", Role::AmbiguousBracket),
        ],
    },
    Group { assoc: Assoc::Left, entries: &[("++", Role::PostfixUnary), ("--", Role::PostfixUnary)] },
    Group {
        assoc: Assoc::Right,
        entries: &[
            ("u+", Role::PrefixUnary),
            ("u-", Role::PrefixUnary),
            ("u!", Role::PrefixUnary),
            ("u~", Role::PrefixUnary),
            ("u++", Role::PrefixUnary),
            ("u--", Role::PrefixUnary),
            ("new", Role::PrefixUnary),
            ("typeof", Role::PrefixUnary),
        ],
    },
    Group {
        assoc: Assoc::Left,
        entries: &[("*", Role::Binary), ("/", Role::Binary), ("%", Role::Binary)],
    },
    Group { assoc: Assoc::Left, entries: &[("+", Role::Binary), ("-", Role::Binary)] },
    Group {
        assoc: Assoc::Left,
        entries: &[("<<", Role::Binary), (">>", Role::Binary), (">>>", Role::Binary)],
    },
    Group {
        assoc: Assoc::Left,
        entries: &[
            ("<", Role::Binary),
            (">", Role::Binary),
            ("<=", Role::Binary),
            (">=", Role::Binary),
            ("instanceof", Role::Binary),
            ("in", Role::Binary),
        ],
    },
    Group {
        assoc: Assoc::Left,
        entries: &[
            ("==", Role::Binary),
            ("!=", Role::Binary),
            ("===", Role::Binary),
            ("!==", Role::Binary),
        ],
    },
    Group { assoc: Assoc::Left, entries: &[("&", Role::Binary)] },
    Group { assoc: Assoc::Left, entries: &[("^", Role::Binary)] },
    Group { assoc: Assoc::Left, entries: &[("|", Role::Binary)] },
    Group { assoc: Assoc::Left, entries: &[("&&", Role::Binary)] },
    Group { assoc: Assoc::Left, entries: &[("||", Role::Binary)] },
    Group { assoc: Assoc::Right, entries: &[("?", Role::Ternary)] },
    // `>$>` is the infix arrow the `dfn` pack lowers to a function
    // literal (spec.md §6); it is a core grammar token like any other
    // binary operator, the pack only supplies the tree-level rewrite.
    Group { assoc: Assoc::Right, entries: &[(">$>", Role::Binary)] },
    Group {
        assoc: Assoc::Right,
        entries: &[
            ("=", Role::Binary),
            ("+=", Role::Binary),
            ("-=", Role::Binary),
            ("*=", Role::Binary),
            ("/=", Role::Binary),
            ("%=", Role::Binary),
            ("<<=", Role::Binary),
            (">>=", Role::Binary),
            (">>>=", Role::Binary),
            ("&=", Role::Binary),
            ("^=", Role::Binary),
            ("|=", Role::Binary),
        ],
    },
    Group {
        assoc: Assoc::Right,
        entries: &[
            ("return", Role::OptionalRightFold),
            ("throw", Role::OptionalRightFold),
            ("break", Role::OptionalRightFold),
            ("continue", Role::OptionalRightFold),
        ],
    },
    Group { assoc: Assoc::Left, entries: &[(",", Role::Binary)] },
    Group { assoc: Assoc::Left, entries: &[(";", Role::Binary)] },
    Group {
        assoc: Assoc::Right,
        entries: &[
            ("function", Role::GrabUntilBlock),
            ("if", Role::GrabUntilBlock),
            ("else", Role::GrabUntilBlock),
            ("for", Role::GrabUntilBlock),
            ("while", Role::GrabUntilBlock),
            ("do", Role::GrabUntilBlock),
            ("try", Role::GrabUntilBlock),
            ("catch", Role::GrabUntilBlock),
            ("with", Role::GrabUntilBlock),
        ],
    },
];

/// Right-associative set: folded from high index to low index within
/// their group.
static ASSOC_INDEX: Lazy<HashMap<&'static str, (usize, Assoc, Role)>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (i, g) in GROUPS.iter().enumerate() {
        for &(t, role) in g.entries {
            m.insert(t, (i, g.assoc, role));
        }
    }
    m
});

/// Longest operator-set key, used to short-circuit membership tests on
/// candidates longer than this (spec.md §3 "each hash table records its
/// longest key").
static OPERATOR_SET: Lazy<(HashSet<&'static str>, usize)> = Lazy::new(|| {
    let mut set = HashSet::new();
    for g in GROUPS {
        for &(t, _) in g.entries {
            set.insert(t);
        }
    }
    let longest = set.iter().map(|s| s.len()).max().unwrap_or(0);
    (set, longest)
});

pub fn reduce_index(data: &str) -> Option<usize> {
    ASSOC_INDEX.get(data).map(|(i, _, _)| *i)
}

pub fn assoc_of(data: &str) -> Option<Assoc> {
    ASSOC_INDEX.get(data).map(|(_, a, _)| *a)
}

pub fn role_of(data: &str) -> Option<Role> {
    ASSOC_INDEX.get(data).map(|(_, _, r)| *r)
}

pub fn group_count() -> usize {
    GROUPS.len()
}

/// Fold direction for the precedence group at `index` (spec.md §4.4:
/// right-associative groups iterate right-to-left).
pub fn group_assoc(index: usize) -> Assoc {
    GROUPS[index].assoc
}

/// Whether `data` is a registered operator/keyword token at all.
pub fn is_operator(data: &str) -> bool {
    if data.len() > OPERATOR_SET.1 {
        return false;
    }
    OPERATOR_SET.0.contains(data)
}

/// Tokens whose right sibling is folded only when it is not `;`.
static OPTIONAL_RIGHT_FOLD: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["return", "throw", "break", "continue", "else"].into_iter().collect());

pub fn is_optional_right_fold(data: &str) -> bool {
    OPTIONAL_RIGHT_FOLD.contains(data)
}

/// Group-opener to closer map: `(`↔`)`, `[`↔`]`, `{`↔`}`, `?`↔`:`.
static OPENER_TO_CLOSER: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [("(", ")"), ("[", "]"), ("{", "}"), ("?", ":")].into_iter().collect()
});

pub fn closer_for(opener: &str) -> Option<&'static str> {
    OPENER_TO_CLOSER.get(opener).copied()
}

pub fn is_group_opener(data: &str) -> bool {
    OPENER_TO_CLOSER.contains_key(data)
}

/// Block-construct continuation map: `if`→`else`, `do`→`while`,
/// `try`→`catch`, `catch`→`finally`.
static CONTINUATION: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [("if", "else"), ("do", "while"), ("try", "catch"), ("catch", "finally")]
        .into_iter()
        .collect()
});

pub fn continuation_for(construct: &str) -> Option<&'static str> {
    CONTINUATION.get(construct).copied()
}

/// Keywords that disallow the bracket-reclassification rule of spec.md
/// §4.4 ("value-disallowing keywords").
static VALUE_DISALLOWING: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["function", "if", "for", "while", "catch"].into_iter().collect());

pub fn disallows_value_position(data: &str) -> bool {
    VALUE_DISALLOWING.contains(data)
}

/// Per-construct maximum number of siblings absorbed before the block
/// body itself (spec.md §4.4: "function takes up to two: optional name +
/// parens"). Constructs not listed absorb zero prefix siblings (`do`,
/// `else`, `try`, `finally`).
pub fn grab_prefix_max(construct: &str) -> usize {
    match construct {
        "function" => 2,
        "if" | "for" | "while" | "catch" | "with" => 1,
        _ => 0,
    }
}

/// The literal glyphs the lexer scans for, as they appear verbatim in
/// source text — distinct from [`OPERATOR_SET`], which also carries the
/// synthetic `u`-prefixed prefix-unary spellings the lexer *produces*
/// but never *reads*. Keeping these separate means the greedy
/// longest-match scan in `src/lexer` never accidentally matches a
/// `u`-prefixed key against raw source bytes.
static LEXABLE_OPERATORS: Lazy<(HashSet<&'static str>, usize)> = Lazy::new(|| {
    let glyphs: &[&str] = &[
        ".", ",", ";", ":", "?", "++", "--", "+", "-", "*", "/", "%", "<<", ">>>", ">>", "<=",
        ">=", "<", ">", "===", "!==", "==", "!=", "&&", "||", "&", "^", "|", "!", "~", "<<=",
        ">>>=", ">>=", "&=", "^=", "|=", "+=", "-=", "*=", "/=", "%=", "=", ">$>",
    ];
    let set: HashSet<&'static str> = glyphs.iter().copied().collect();
    let longest = set.iter().map(|s| s.len()).max().unwrap_or(0);
    (set, longest)
});

pub fn is_lexable_operator(s: &str) -> bool {
    LEXABLE_OPERATORS.0.contains(s)
}

pub fn longest_lexable_operator_len() -> usize {
    LEXABLE_OPERATORS.1
}

/// Tokens that terminate a value (can end an expression), used by the
/// lexer's regex-vs-division state (spec.md §4.3). Identifiers, numbers,
/// strings and `)`/`]` are handled structurally by the lexer itself; this
/// covers the keyword exception list.
pub fn is_block_introducing_keyword(data: &str) -> bool {
    matches!(
        data,
        "if" | "for" | "while" | "with" | "do" | "catch" | "function"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_key_short_circuit() {
        assert!(!is_operator("a_very_long_identifier_like_token"));
        assert!(is_operator("==="));
        assert!(is_operator(","));
    }

    #[test]
    fn reduce_index_orders_precedence() {
        let star = reduce_index("*").unwrap();
        let plus = reduce_index("+").unwrap();
        let comma = reduce_index(",").unwrap();
        assert!(star < plus);
        assert!(plus < comma);
    }

    #[test]
    fn continuation_map() {
        assert_eq!(continuation_for("if"), Some("else"));
        assert_eq!(continuation_for("try"), Some("catch"));
        assert_eq!(continuation_for("catch"), Some("finally"));
        assert_eq!(continuation_for("else"), None);
    }
}
