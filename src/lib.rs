//! Metadesk is a library for parsing a small, regular data-description language into a
//! uniform tree of [Node]s suitable for downstream code generation, configuration, and
//! metaprogramming.
//!
//! # Design
//!
//! A Metadesk file is a sequence of *elements*. An element is a label (an identifier,
//! number, string, or symbol), a bracketed *set* of further elements, or a labeled element
//! (`name: value`). Elements may be preceded by `@tag(args)` annotations, and separated by
//! `,` or `;`. The [parser] turns this into a tree of [Node]s, threading siblings, children,
//! and tags through explicit links rather than nesting `Vec`s, so that a node knows its own
//! position among its siblings without the caller needing to track an index.
//!
//! Every node produced by a parse is owned by an [Arena] handed to the parser by the
//! caller; the arena never frees a single node, only the whole arena at once, and the
//! "absent" link in every direction (no parent, no next sibling, and so on) is a single
//! reserved nil node rather than an optional reference. This mirrors how the tree is built
//! in the reference implementation this crate's node model is adapted from, translated to
//! arena-relative indices instead of raw self-referential pointers.
//!
//! # Example
//!
//! ```
//! use metadesk::arena::Arena;
//! use metadesk::parser;
//!
//! let mut arena = Arena::new();
//! let result = parser::parse_whole_string(&mut arena, "example.md", b"foo: 123");
//! assert!(result.messages.max_kind.is_none());
//!
//! let file = arena.node(result.node);
//! let foo = arena.node(file.first_child.get());
//! assert_eq!(arena.string_of(foo), b"foo");
//! ```

pub mod arena;
pub mod code_loc;
pub mod error;
pub mod flags;
pub mod lexer;
pub mod list;
pub mod log;
pub mod message;
pub mod node;
pub mod parser;
pub mod printer;
pub mod string_view;

pub use arena::{Arena, NodeId};
pub use code_loc::CodeLoc;
pub use error::InternalError;
pub use flags::{MatchFlags, NodeFlags, TokenGroups, TokenKind};
pub use message::{Diagnostic, Message, MessageKind, MessageList};
pub use node::{Node, NodeKind};
pub use parser::ParseResult;
pub use printer::NodeView;
pub use string_view::StringView;
