//! The non-recursive, O(n) lexer (spec.md §4.3). One pass over byte
//! offsets with `mark..i` substring slicing — no concatenation, no
//! regex-derive crate, just the boolean lookup tables in
//! [`tables`] and a small amount of carried state (grouping stack,
//! regex-vs-division flag).

pub mod tables;

use smol_str::SmolStr;

use crate::error::Error;
use crate::tree::{kind, NodeId, RibbonArena};

/// Output of a lexing pass, ready for [`crate::parser::parse_ribbon`].
pub struct LexOutput {
    pub arena: RibbonArena,
    pub root: NodeId,
    /// `fold_index[group] -> nodes in source order`, one bucket per
    /// precedence group (spec.md §3, §4.3).
    pub fold_index: Vec<Vec<NodeId>>,
    /// Group-opener nodes (`(`, `[`) that Pass A may reclassify as
    /// invocation/dereference (spec.md §4.4).
    pub invocation_candidates: Vec<NodeId>,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.src[self.pos..].chars();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }
}

struct Scope {
    parent: NodeId,
    closer: &'static str,
    /// Whether the token immediately preceding this group's opener (in
    /// the outer scope) was a block-introducing keyword — governs the
    /// regex/division flip on `)` (spec.md §4.3's exception clause).
    after_keyword: bool,
}

struct Lexer<'a> {
    src: &'a str,
    arena: RibbonArena,
    root: NodeId,
    current: NodeId,
    last: Option<NodeId>,
    stack: Vec<Scope>,
    fold_index: Vec<Vec<NodeId>>,
    invocation_candidates: Vec<NodeId>,
    /// `true` means the next token is in value-expected (prefix)
    /// position — a `/` here opens a regex literal, not division.
    regex_mode: bool,
}

const PREFIXABLE: [&str; 6] = ["+", "-", "!", "~", "++", "--"];

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        let mut arena = RibbonArena::new();
        let root = arena.push("#root");
        Lexer {
            src,
            arena,
            root,
            current: root,
            last: None,
            stack: Vec::new(),
            fold_index: (0..kind::group_count()).map(|_| Vec::new()).collect(),
            invocation_candidates: Vec::new(),
            regex_mode: true,
        }
    }

    fn emit(&mut self, data: impl Into<SmolStr>) -> NodeId {
        let data = data.into();
        let id = match self.last {
            Some(prev) => self.arena.append_sibling(prev, data.clone()),
            None => self.arena.append_first_child(self.current, data.clone()),
        };
        self.last = Some(id);
        if let Some(group) = kind::reduce_index(&data) {
            self.fold_index[group].push(id);
        }
        id
    }

    fn run(&mut self) -> Result<(), Error> {
        let mut cur = Cursor { src: self.src, pos: 0 };
        while !cur.at_end() {
            let before = cur.pos;
            self.step(&mut cur);
            if cur.pos == before {
                return Err(Error::LexerStall { offset: before });
            }
        }
        Ok(())
    }

    fn step(&mut self, cur: &mut Cursor) {
        let c = match cur.peek() {
            Some(c) => c,
            None => return,
        };

        if tables::is_whitespace(c) {
            cur.bump();
            return;
        }

        if c == '/' {
            match cur.peek2() {
                Some('/') => {
                    skip_line_comment(cur);
                    return;
                }
                Some('*') => {
                    skip_block_comment(cur);
                    return;
                }
                _ => {
                    if self.regex_mode {
                        self.lex_regex(cur);
                    } else {
                        self.lex_operator_token(cur);
                    }
                    return;
                }
            }
        }

        if tables::is_ident_start(c) {
            self.lex_ident(cur);
            return;
        }

        if tables::is_digit(c) || (c == '.' && cur.peek2().is_some_and(tables::is_digit)) {
            self.lex_number(cur);
            return;
        }

        if c == '"' || c == '\'' {
            self.lex_string(cur, c);
            return;
        }

        if c == '(' || c == '[' || c == '{' {
            cur.bump();
            self.open_group(c);
            return;
        }

        if c == ')' || c == ']' || c == '}' {
            cur.bump();
            self.close_group(c);
            return;
        }

        if tables::is_punctuation(c) {
            self.lex_operator_token(cur);
            return;
        }

        // No classification matched (stray byte in otherwise well-formed
        // input): consume it silently. Lexing never validates syntax
        // (spec.md §1 non-goals); the only hard failure is zero progress.
        cur.bump();
    }

    fn lex_ident(&mut self, cur: &mut Cursor) {
        let start = cur.pos;
        while cur.peek().is_some_and(tables::is_ident_continue) {
            cur.bump();
        }
        let text = SmolStr::from(&self.src[start..cur.pos]);
        let is_op = kind::is_operator(&text);
        self.emit(text);
        self.regex_mode = is_op;
    }

    fn lex_number(&mut self, cur: &mut Cursor) {
        let start = cur.pos;
        if cur.peek() == Some('0') && matches!(cur.peek2(), Some('x') | Some('X')) {
            cur.bump();
            cur.bump();
            while cur.peek().is_some_and(tables::is_hex_digit) {
                cur.bump();
            }
        } else if cur.peek() == Some('0') && cur.peek2().is_some_and(tables::is_digit) {
            cur.bump();
            while cur.peek().is_some_and(tables::is_digit) {
                cur.bump();
            }
        } else {
            while cur.peek().is_some_and(tables::is_digit) {
                cur.bump();
            }
            if cur.peek() == Some('.') {
                cur.bump();
                while cur.peek().is_some_and(tables::is_digit) {
                    cur.bump();
                }
            }
            if cur.peek().is_some_and(tables::is_exponent_marker) {
                let save = cur.pos;
                cur.bump();
                if matches!(cur.peek(), Some('+') | Some('-')) {
                    cur.bump();
                }
                if cur.peek().is_some_and(tables::is_digit) {
                    while cur.peek().is_some_and(tables::is_digit) {
                        cur.bump();
                    }
                } else {
                    cur.pos = save;
                }
            }
        }
        let text = SmolStr::from(&self.src[start..cur.pos]);
        self.emit(text);
        self.regex_mode = false;
    }

    fn lex_string(&mut self, cur: &mut Cursor, quote: char) {
        let start = cur.pos;
        cur.bump();
        while let Some(c) = cur.peek() {
            if c == '\\' {
                cur.bump();
                if cur.peek().is_some() {
                    cur.bump();
                }
                continue;
            }
            if c == quote {
                cur.bump();
                break;
            }
            cur.bump();
        }
        let text = SmolStr::from(&self.src[start..cur.pos]);
        self.emit(text);
        self.regex_mode = false;
    }

    fn lex_regex(&mut self, cur: &mut Cursor) {
        let start = cur.pos;
        cur.bump(); // opening '/'
        let mut in_class = false;
        while let Some(c) = cur.peek() {
            if c == '\\' {
                cur.bump();
                if cur.peek().is_some() {
                    cur.bump();
                }
                continue;
            }
            if c == '[' {
                in_class = true;
                cur.bump();
                continue;
            }
            if c == ']' {
                in_class = false;
                cur.bump();
                continue;
            }
            if c == '/' && !in_class {
                cur.bump();
                break;
            }
            cur.bump();
        }
        while cur.peek().is_some_and(tables::is_regex_suffix) {
            cur.bump();
        }
        let text = SmolStr::from(&self.src[start..cur.pos]);
        self.emit(text);
        self.regex_mode = false;
    }

    fn match_operator_text(&self, cur: &mut Cursor) -> SmolStr {
        let rest = &self.src[cur.pos..];
        let max_len = kind::longest_lexable_operator_len().min(rest.len()).max(1);
        let mut chosen = 1usize;
        for len in (1..=max_len).rev() {
            if rest.is_char_boundary(len) && kind::is_lexable_operator(&rest[..len]) {
                chosen = len;
                break;
            }
        }
        let text = SmolStr::from(&rest[..chosen]);
        cur.pos += chosen;
        text
    }

    fn lex_operator_token(&mut self, cur: &mut Cursor) {
        let was_value_expected = self.regex_mode;
        let raw = self.match_operator_text(cur);
        let data: SmolStr = if was_value_expected && PREFIXABLE.contains(&raw.as_str()) {
            format!("u{raw}").into()
        } else {
            raw.clone()
        };
        self.emit(data);
        let is_postfix_step = !was_value_expected && matches!(raw.as_str(), "++" | "--");
        self.regex_mode = !is_postfix_step;
    }

    fn open_group(&mut self, opener: char) {
        let opener_str: &'static str = match opener {
            '(' => "(",
            '[' => "[",
            '{' => "{",
            _ => unreachable!(),
        };
        let closer = kind::closer_for(opener_str).unwrap_or("");
        let after_keyword = self
            .last
            .map(|id| kind::is_block_introducing_keyword(self.arena.data(id)))
            .unwrap_or(false);
        let group_id = match self.last {
            Some(prev) => self.arena.append_group(Some(prev), None, opener_str),
            None => self.arena.append_group(None, Some(self.current), opener_str),
        };
        if let Some(group) = kind::reduce_index(opener_str) {
            self.fold_index[group].push(group_id);
            self.invocation_candidates.push(group_id);
        }
        self.stack.push(Scope { parent: self.current, closer, after_keyword });
        self.current = group_id;
        self.last = None;
        self.regex_mode = true;
    }

    fn close_group(&mut self, closer: char) {
        let closer_str = match closer {
            ')' => ")",
            ']' => "]",
            '}' => "}",
            _ => unreachable!(),
        };
        let scope = match self.stack.pop() {
            Some(s) => s,
            None => return, // stray closer: no syntactic validation (spec.md §1)
        };
        let group_id = self.current;
        self.current = scope.parent;
        self.last = Some(group_id);
        debug_assert_eq!(scope.closer, closer_str);
        self.regex_mode = match closer_str {
            ")" => scope.after_keyword,
            "]" => false,
            _ => true, // "}"
        };
    }
}

fn skip_line_comment(cur: &mut Cursor) {
    while let Some(c) = cur.peek() {
        if c == '\n' {
            break;
        }
        cur.bump();
    }
}

fn skip_block_comment(cur: &mut Cursor) {
    cur.bump();
    cur.bump();
    while let Some(c) = cur.peek() {
        if c == '*' && cur.peek2() == Some('/') {
            cur.bump();
            cur.bump();
            break;
        }
        cur.bump();
    }
}

/// Lex `src` into a ribbon plus fold/invocation indexes. Fails only on a
/// zero-progress iteration (spec.md §4.3's termination invariant).
pub fn lex(src: &str) -> Result<LexOutput, Error> {
    let mut lexer = Lexer::new(src);
    lexer.run()?;
    Ok(LexOutput {
        arena: lexer.arena,
        root: lexer.root,
        fold_index: lexer.fold_index,
        invocation_candidates: lexer.invocation_candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(out: &LexOutput) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack = vec![out.root];
        // breadth-first is fine for these small fixtures; order within a
        // level follows child order which matches source order.
        let mut visited = Vec::new();
        while let Some(id) = stack.pop() {
            visited.push(id);
            for &c in out.arena.children(id) {
                stack.push(c);
            }
        }
        visited.reverse();
        for id in visited {
            if out.arena.children(id).is_empty() {
                result.push(out.arena.data(id).to_string());
            }
        }
        result
    }

    #[test]
    fn disambiguates_prefix_minus_from_binary() {
        let out = lex("x - 1").unwrap();
        let toks = leaves(&out);
        assert!(toks.contains(&"-".to_string()));
        let out2 = lex("-1").unwrap();
        let toks2 = leaves(&out2);
        assert!(toks2.contains(&"u-".to_string()));
    }

    #[test]
    fn regex_after_keyword_close_paren() {
        // `if (condition) /foo/.test(x)` — the `/` after `)` following
        // `if (...)` must lex as a regex, not division.
        let out = lex("if (condition) /foo/.test(x)").unwrap();
        let toks = leaves(&out);
        assert!(toks.iter().any(|t| t == "/foo/"));
    }

    #[test]
    fn division_after_identifier() {
        let out = lex("a / b").unwrap();
        let toks = leaves(&out);
        assert!(toks.contains(&"/".to_string()));
    }

    #[test]
    fn number_forms() {
        for (src, expect) in
            [("42", "42"), ("0x1F", "0x1F"), ("0755", "0755"), ("3.14", "3.14"), ("2.5e-3", "2.5e-3")]
        {
            let out = lex(src).unwrap();
            let toks = leaves(&out);
            assert_eq!(toks, vec![expect.to_string()], "lexing {src}");
        }
    }

    #[test]
    fn leading_dot_number() {
        let out = lex(".5").unwrap();
        assert_eq!(leaves(&out), vec![".5".to_string()]);
    }

    #[test]
    fn string_and_regex_escapes() {
        let out = lex(r#""a\"b""#).unwrap();
        assert_eq!(leaves(&out), vec![r#""a\"b""#.to_string()]);
        let out2 = lex(r"/a\/b/gi").unwrap();
        assert_eq!(leaves(&out2), vec![r"/a\/b/gi".to_string()]);
    }

    #[test]
    fn comments_emit_no_tokens() {
        let out = lex("a // trailing comment\n+ /* inline */ b").unwrap();
        assert_eq!(leaves(&out), vec!["a".to_string(), "+".to_string(), "b".to_string()]);
    }

    proptest::proptest! {
        #[test]
        fn never_stalls(s in "[ -~\\n]{0,64}") {
            let _ = lex(&s);
        }
    }
}
