//! `ribtree`: a lexer, operator-precedence parser, pattern matcher and
//! macroexpander for a small C-family expression language, plus a
//! source serializer and an environment-capturing compile step. The
//! engine only rewrites text; it never evaluates the host language and
//! performs no I/O (see `DESIGN.md` for what's in and out of scope).

pub mod compile;
pub mod engine;
pub mod error;
pub mod expand;
pub mod lexer;
pub mod packs;
pub mod parser;
pub mod pattern;
pub mod serialize;
pub mod symbol;
pub mod tree;

pub use compile::{Compiled, Environment};
pub use engine::Engine;
pub use error::Error;
pub use expand::MacroRegistry;
pub use parser::parse;
pub use pattern::{try_match, Captures};
pub use serialize::serialize;
pub use symbol::SymbolGenerator;
pub use tree::Node;
