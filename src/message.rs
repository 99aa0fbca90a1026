//! Diagnostics produced while lexing or parsing.
//!
//! Messages are threaded into a singly linked list the same way nodes are: a [MessageList]
//! holds `first`/`last` ids and a running `max_kind`, so a caller can check
//! `result.messages.max_kind` once against whatever severity it treats as fatal instead of
//! walking the whole list.

use crate::arena::{Arena, NodeId};
use crate::code_loc::{code_loc_from_node, CodeLoc};
use crate::lexer::Token;
use crate::node::NodeKind;
use crate::string_view::StringView;
use std::cell::Cell;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(u32);

impl MessageId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn to_index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

/// Severity of a [Message], ordered low to high. `CatastrophicError` is the one kind the
/// parser treats as a signal to stop descending rather than recover and continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    Note,
    Warning,
    Error,
    CatastrophicError,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageKind::Note => "note",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
            MessageKind::CatastrophicError => "catastrophic error",
        };
        f.write_str(label)
    }
}

pub struct Message<'s> {
    pub kind: MessageKind,
    /// The node the message is attached to, or [NodeId::NIL] if it predates any node
    /// (e.g. a lexer error before the first token was turned into a node).
    pub node: NodeId,
    pub string: StringView<'s>,
    pub(crate) next: Cell<Option<MessageId>>,
}

#[derive(Default)]
pub struct MessageList {
    first: Option<MessageId>,
    last: Option<MessageId>,
    pub count: usize,
    pub max_kind: Option<MessageKind>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Thread `id` onto the end of the list and update `max_kind`. The caller has already
    /// allocated the message in the arena; this only links it in.
    pub fn push(&mut self, arena: &crate::arena::Arena<'_>, id: MessageId) {
        let kind = arena.message(id).kind;
        match self.last {
            None => {
                self.first = Some(id);
                self.last = Some(id);
            }
            Some(last) => {
                arena.message(last).next.set(Some(id));
                self.last = Some(id);
            }
        }
        self.count += 1;
        self.max_kind = Some(match self.max_kind {
            Some(current) if current >= kind => current,
            _ => kind,
        });
    }

    pub fn iter<'a, 's>(&self, arena: &'a crate::arena::Arena<'s>) -> MessageIter<'a, 's> {
        MessageIter {
            arena,
            next: self.first,
        }
    }
}

pub struct MessageIter<'a, 's> {
    arena: &'a crate::arena::Arena<'s>,
    next: Option<MessageId>,
}

impl<'a, 's> Iterator for MessageIter<'a, 's> {
    type Item = &'a Message<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let message = self.arena.message(id);
        self.next = message.next.get();
        Some(message)
    }
}

/// A [Message] paired with the resolved [CodeLoc] of the node it is attached to, ready to
/// render in the compiler-conventional `FILE:LINE:COLUMN: KIND: MESSAGE` shape (§6). Unlike
/// [MessageKind]'s own `Display`, a [CatastrophicError](MessageKind::CatastrophicError) is
/// spelled `fatal` here, matching that format's four-way `KIND` vocabulary.
pub struct Diagnostic<'s> {
    pub loc: CodeLoc<'s>,
    pub kind: MessageKind,
    pub text: StringView<'s>,
}

impl<'s> Diagnostic<'s> {
    /// Resolve `message`'s node to a source location and pair it with the message's own
    /// kind and text.
    pub fn new(arena: &Arena<'s>, message: &Message<'s>) -> Self {
        Self {
            loc: code_loc_from_node(arena, message.node),
            kind: message.kind,
            text: message.string,
        }
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MessageKind::Note => "note",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
            MessageKind::CatastrophicError => "fatal",
        };
        write!(f, "{}: {}: {}", self.loc, kind, String::from_utf8_lossy(self.text.as_bytes()))
    }
}

/// Allocate a message attached to an existing node. The caller still threads it into a
/// [MessageList] with [MessageList::push].
pub fn make_node_error<'s>(arena: &mut Arena<'s>, node: NodeId, kind: MessageKind, text: StringView<'s>) -> MessageId {
    arena.alloc_message(kind, node, text)
}

/// Allocate an [NodeKind::ErrorMarker] at `offset` for a lexical error discovered in `token`,
/// then a message attached to it. Returns both ids so the caller can link the marker into
/// the tree and the message into the stream.
pub fn make_token_error<'s>(
    arena: &mut Arena<'s>,
    token: Token<'s>,
    offset: usize,
    kind: MessageKind,
    text: StringView<'s>,
) -> (NodeId, MessageId) {
    let marker = arena.alloc_node(NodeKind::ErrorMarker, token.string, token.raw_string, offset);
    let message = arena.alloc_message(kind, marker, text);
    (marker, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn push_tracks_count_and_max_kind() {
        let mut arena = Arena::new();
        let mut list = MessageList::new();
        let a = arena.alloc_message(MessageKind::Warning, NodeId::NIL, StringView::from("w"));
        list.push(&arena, a);
        let b = arena.alloc_message(MessageKind::Error, NodeId::NIL, StringView::from("e"));
        list.push(&arena, b);

        assert_eq!(list.count, 2);
        assert_eq!(list.max_kind, Some(MessageKind::Error));
    }

    #[test]
    fn max_kind_does_not_downgrade() {
        let mut arena = Arena::new();
        let mut list = MessageList::new();
        let a = arena.alloc_message(MessageKind::CatastrophicError, NodeId::NIL, StringView::empty());
        list.push(&arena, a);
        let b = arena.alloc_message(MessageKind::Note, NodeId::NIL, StringView::empty());
        list.push(&arena, b);

        assert_eq!(list.max_kind, Some(MessageKind::CatastrophicError));
    }

    #[test]
    fn iter_walks_in_push_order() {
        let mut arena = Arena::new();
        let mut list = MessageList::new();
        let a = arena.alloc_message(MessageKind::Note, NodeId::NIL, StringView::from("a"));
        let b = arena.alloc_message(MessageKind::Note, NodeId::NIL, StringView::from("b"));
        list.push(&arena, a);
        list.push(&arena, b);

        let strings: Vec<&[u8]> = list.iter(&arena).map(|m| m.string.as_bytes()).collect();
        assert_eq!(strings, vec![b"a".as_slice(), b"b".as_slice()]);
    }

    #[test]
    fn diagnostic_renders_fatal_for_catastrophic_error() {
        use crate::node::NodeKind;

        let mut arena = Arena::new();
        let contents: &'static [u8] = b"foo: \"bar";
        let file = arena.alloc_node(NodeKind::File, StringView::from("f.md"), StringView::new(contents), 0);
        let marker = arena.alloc_node(NodeKind::ErrorMarker, StringView::empty(), StringView::empty(), 5);
        arena.push_child(file, marker);
        let msg_id = arena.alloc_message(MessageKind::CatastrophicError, marker, StringView::from("unterminated set"));

        let diagnostic = Diagnostic::new(&arena, arena.message(msg_id));
        assert_eq!(diagnostic.loc.filename, "f.md");
        assert_eq!(format!("{}", diagnostic), "f.md:1:6: fatal: unterminated set");
    }

    #[test]
    fn make_token_error_builds_marker_and_message() {
        use crate::lexer::token_from;

        let mut arena = Arena::new();
        let bytes: &[u8] = b"`broken";
        let token = token_from(bytes, 0);
        let (marker, msg) = make_token_error(&mut arena, token, 0, MessageKind::Error, StringView::from("unterminated string"));

        assert_eq!(arena.node(marker).kind, NodeKind::ErrorMarker);
        assert_eq!(arena.message(msg).node, marker);
        assert_eq!(arena.message(msg).kind, MessageKind::Error);
    }
}
