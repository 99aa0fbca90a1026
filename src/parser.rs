//! The recursive-descent parser: turns a flat token stream into a tree of [Node]s.
//!
//! The grammar is small on purpose. A file is a sequence of *elements*; an element is
//! optional leading `@tag`s followed by either a bare bracketed set, a label with an
//! optionally attached set, or a label followed by `:` and exactly one child element.
//! Everything the lexer classifies as irregular (whitespace, newlines, comments) is skipped
//! between elements, with same-line comments opportunistically attached to the node they sit
//! next to — see [Node::prev_comment]/[Node::next_comment].
//!
//! Recovery is local: a lexical error or an unexpected token becomes an
//! [NodeKind::ErrorMarker] with a message attached, and parsing resumes right after it rather
//! than abandoning the whole file.

use crate::arena::{Arena, NodeId};
use crate::flags::{NodeFlags, TokenGroups, TokenKind};
use crate::lexer::{self, token_from, Token};
use crate::log::{self, Log};
use crate::message::{make_token_error, MessageKind, MessageList};
use crate::node::NodeKind;
use crate::string_view::StringView;

/// The outcome of a whole-string or single-node parse: the node it produced (or the [Arena]'s
/// nil sentinel, for an empty input), every diagnostic raised along the way, and how many
/// bytes of the input were consumed.
pub struct ParseResult<'s> {
    pub node: NodeId,
    pub messages: MessageList,
    pub string_advance: usize,
}

/// Parse `contents` as a whole file named `filename`, producing a [NodeKind::File] node whose
/// children are its top-level elements.
pub fn parse_whole_string<'s>(arena: &mut Arena<'s>, filename: &'s str, contents: &'s [u8]) -> ParseResult<'s> {
    parse_whole_string_traced(arena, filename, contents, Log::None)
}

/// As [parse_whole_string], with a tracing level threaded down to the lexer's skip calls.
pub fn parse_whole_string_traced<'s>(
    arena: &mut Arena<'s>,
    filename: &'s str,
    contents: &'s [u8],
    log_level: Log<&'static str>,
) -> ParseResult<'s> {
    let mut parser = Parser::new(arena, contents, log_level);
    let file = parser
        .arena
        .alloc_node(NodeKind::File, StringView::from(filename), StringView::new(contents), 0);
    let string_advance = parser.parse_elements(file, 0, None);
    ParseResult {
        node: file,
        messages: parser.messages,
        string_advance,
    }
}

/// Parse exactly one element (its leading tags, its own body, and any trailing separator)
/// starting at `offset`, without requiring the rest of `bytes` to be consumed. The returned
/// node has no parent — attach it yourself if it needs one.
pub fn parse_one_node<'s>(arena: &mut Arena<'s>, bytes: &'s [u8], offset: usize) -> ParseResult<'s> {
    parse_one_node_traced(arena, bytes, offset, Log::None)
}

pub fn parse_one_node_traced<'s>(
    arena: &mut Arena<'s>,
    bytes: &'s [u8],
    offset: usize,
    log_level: Log<&'static str>,
) -> ParseResult<'s> {
    let mut parser = Parser::new(arena, bytes, log_level);
    let mut cur = offset;
    let (node, end) = loop {
        match parser.parse_next_element(NodeId::NIL, cur, NodeFlags::NONE, None) {
            NextElement::Node(node, new_offset) => {
                let (final_offset, _) = parser.consume_trailing_separators(node, new_offset);
                break (node, final_offset);
            }
            NextElement::Continue(new_offset) => cur = new_offset,
            NextElement::Eof(eof_offset) => break (NodeId::NIL, eof_offset),
            NextElement::Closer(_) | NextElement::Mismatched(_) => {
                unreachable!("a parse with no expected closer never reports one")
            }
        }
    };
    ParseResult {
        node,
        messages: parser.messages,
        string_advance: end - offset,
    }
}

/// What one call to [Parser::parse_next_element] found at the cursor.
enum NextElement {
    /// A node was built; resume from the returned offset.
    Node(NodeId, usize),
    /// Nothing was built (a stray separator was absorbed, or a malformed tag run was
    /// discarded), but the cursor still moved; resume from the returned offset.
    Continue(usize),
    /// The closing delimiter the caller was waiting for, unconsumed at this offset.
    Closer(usize),
    /// A closing delimiter that doesn't match what the caller expected, unconsumed.
    Mismatched(usize),
    /// End of input, at the returned offset.
    Eof(usize),
}

struct Parser<'a, 's> {
    arena: &'a mut Arena<'s>,
    bytes: &'s [u8],
    messages: MessageList,
    log_level: Log<&'static str>,
}

impl<'a, 's> Parser<'a, 's> {
    fn new(arena: &'a mut Arena<'s>, bytes: &'s [u8], log_level: Log<&'static str>) -> Self {
        Self {
            arena,
            bytes,
            messages: MessageList::new(),
            log_level,
        }
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        log::trace(self.log_level, Log::Default(()), message);
    }

    fn skip_irregular(&self, offset: usize) -> usize {
        lexer::skip_traced(self.bytes, offset, TokenGroups::IRREGULAR, self.log_level)
    }

    /// Skip whitespace/comments, remembering the *last* comment seen as long as it isn't
    /// separated from `offset`'s eventual token by a blank line. A run like
    /// `// a\n\n// b\nfoo` attaches only `b` to `foo`; `// a\n// b\nfoo` attaches only `b`
    /// too, since a `prev_comment` is "the comment immediately before", not "every comment".
    fn skip_irregular_capturing_prev_comment(&self, offset: usize) -> (usize, Option<StringView<'s>>) {
        let mut pos = offset;
        let mut comment = None;
        while pos < self.bytes.len() {
            let token = token_from(self.bytes, pos);
            if !TokenGroups::IRREGULAR.intersects(token.kind) {
                break;
            }
            if token.kind == TokenKind::COMMENT {
                comment = Some(token.string);
            } else if token.kind == TokenKind::NEWLINE {
                // A blank line (two newlines with only spaces between) breaks attachment.
                let mut lookahead = pos + 1;
                while lookahead < self.bytes.len() && lexer::is_space(self.bytes[lookahead]) {
                    lookahead += 1;
                }
                if lookahead < self.bytes.len() && self.bytes[lookahead] == b'\n' {
                    comment = None;
                }
            }
            pos += token.len().max(1);
        }
        (pos, comment)
    }

    /// If a same-line comment immediately follows `offset` (no newline in between), consume
    /// it and return the advanced offset; otherwise return `offset` unchanged.
    fn maybe_attach_next_comment(&mut self, node: NodeId, offset: usize) -> usize {
        let mut pos = offset;
        while pos < self.bytes.len() && lexer::is_space(self.bytes[pos]) {
            pos += 1;
        }
        if pos < self.bytes.len() {
            let token = token_from(self.bytes, pos);
            if token.kind == TokenKind::COMMENT {
                self.arena.node(node).next_comment.set(token.string);
                return pos + token.len().max(1);
            }
        }
        offset
    }

    fn push_message(&mut self, node: NodeId, kind: MessageKind, text: &'static str) {
        let id = self.arena.alloc_message(kind, node, StringView::from(text));
        self.messages.push(self.arena, id);
    }

    fn apply_prev_comment(&mut self, node: NodeId, prev_comment: Option<StringView<'s>>) {
        if let Some(comment) = prev_comment {
            self.arena.node(node).prev_comment.set(comment);
        }
    }

    fn apply_pending_after(&mut self, node: NodeId, pending_after: NodeFlags) {
        if !pending_after.is_empty() {
            let flags = self.arena.node(node).flags.get();
            self.arena.node(node).flags.set(flags | pending_after);
        }
    }

    /// If `token` (found at `offset`) is a closing delimiter, decide what the caller should
    /// do with it: matches `expected_closer` (stop and let the caller consume it), mismatches
    /// it (stop without consuming, so an ancestor can close on it instead), or is a stray
    /// closer with nothing open to match (recover by turning it into an error marker).
    fn check_closer(
        &mut self,
        parent: NodeId,
        offset: usize,
        token: &Token<'s>,
        expected_closer: Option<u8>,
    ) -> Option<NextElement> {
        if token.kind != TokenKind::RESERVED {
            return None;
        }
        let byte = token.raw_string.as_bytes()[0];
        if !matches!(byte, b')' | b']' | b'}') {
            return None;
        }
        match expected_closer {
            Some(expected) if expected == byte => Some(NextElement::Closer(offset)),
            Some(_) => Some(NextElement::Mismatched(offset)),
            None => {
                let (marker, msg) =
                    make_token_error(self.arena, *token, offset, MessageKind::Error, StringView::from("unexpected closing delimiter"));
                self.messages.push(self.arena, msg);
                self.arena.push_child(parent, marker);
                Some(NextElement::Node(marker, offset + token.len()))
            }
        }
    }

    fn is_separator(token: &Token<'s>) -> bool {
        token.kind == TokenKind::RESERVED && matches!(token.raw_string.as_bytes()[0], b',' | b';')
    }

    fn before_flag_for(separator_byte: u8) -> NodeFlags {
        if separator_byte == b',' {
            NodeFlags::IS_BEFORE_COMMA
        } else {
            NodeFlags::IS_BEFORE_SEMICOLON
        }
    }

    fn recover_from_bad_token(&mut self, parent: NodeId, offset: usize, token: Token<'s>, pending_after: NodeFlags) -> NextElement {
        let text = if token.kind == TokenKind::BROKEN_COMMENT {
            "unterminated block comment"
        } else if token.kind == TokenKind::BROKEN_STRING_LITERAL {
            "unterminated string literal"
        } else {
            "unrecognized character"
        };
        self.trace(|| format!("parser: recovering from bad token at {}: {}", offset, text));
        let (marker, msg) = make_token_error(self.arena, token, offset, MessageKind::Error, StringView::from(text));
        self.messages.push(self.arena, msg);
        self.apply_pending_after(marker, pending_after);
        self.arena.push_child(parent, marker);
        NextElement::Node(marker, offset + token.len().max(1))
    }

    /// Parse a single `@name` or `@name(args...)` tag starting at the `@` symbol. Returns
    /// `None` (after recording a diagnostic) if no identifier follows the `@`.
    fn parse_tag(&mut self, at_offset: usize) -> Option<(NodeId, usize)> {
        let at_token = token_from(self.bytes, at_offset);
        let mut offset = self.skip_irregular(at_offset + at_token.len());
        if offset >= self.bytes.len() {
            self.push_message(NodeId::NIL, MessageKind::Error, "expected an identifier after '@'");
            return None;
        }
        let ident = token_from(self.bytes, offset);
        if ident.kind != TokenKind::IDENTIFIER {
            self.push_message(NodeId::NIL, MessageKind::Error, "expected an identifier after '@'");
            return None;
        }
        let mut end_offset = offset + ident.len();
        let raw_string = StringView::new(&self.bytes[at_offset..end_offset]);
        let tag = self.arena.alloc_node(NodeKind::Tag, ident.string, raw_string, at_offset);
        offset = end_offset;

        let peek_offset = self.skip_irregular(offset);
        if peek_offset < self.bytes.len() {
            let peek = token_from(self.bytes, peek_offset);
            if peek.kind == TokenKind::RESERVED {
                if let Some((close_byte, left_flag)) = delim_info(peek.raw_string.as_bytes()[0]) {
                    let flags = self.arena.node(tag).flags.get();
                    self.arena.node(tag).flags.set(flags | left_flag);
                    end_offset = self.parse_elements(tag, peek_offset + peek.len(), Some(close_byte));
                }
            }
        }
        Some((tag, end_offset))
    }

    /// Build a bare bracketed set (no label) at `open_offset`, recursing into its body.
    fn parse_bare_set(&mut self, parent: NodeId, open_offset: usize) -> (NodeId, usize) {
        let open_token = token_from(self.bytes, open_offset);
        let (close_byte, left_flag) =
            delim_info(open_token.raw_string.as_bytes()[0]).expect("caller only calls this on an opening delimiter");
        self.trace(|| format!("parser: opening bare set at {}", open_offset));
        let node = self
            .arena
            .alloc_node(NodeKind::Main, StringView::empty(), open_token.raw_string, open_offset);
        self.arena.node(node).flags.set(left_flag);
        self.arena.push_child(parent, node);
        let end = self.parse_elements(node, open_offset + open_token.len(), Some(close_byte));
        (node, end)
    }

    /// Build a label node at `label_offset`, then look for what follows it: `:` and a single
    /// child element, an attached bracketed set, or nothing (a plain leaf label).
    ///
    /// `expected_closer` is whatever the enclosing [Parser::parse_elements] call is waiting
    /// for — threaded through so that `label:` immediately followed by that closer (e.g.
    /// `{ a: }`) is recognized as "no element after ':'" rather than as a stray closing
    /// delimiter that gets eaten as an error marker.
    fn parse_labeled(&mut self, parent: NodeId, label_offset: usize, label_token: Token<'s>, expected_closer: Option<u8>) -> (NodeId, usize) {
        let mut offset = label_offset + label_token.len();
        let node = self
            .arena
            .alloc_node(NodeKind::Main, label_token.string, label_token.raw_string, label_offset);
        self.arena.node(node).flags.set(label_token.node_flags);
        self.arena.push_child(parent, node);

        let peek_offset = self.skip_irregular(offset);
        if peek_offset >= self.bytes.len() {
            return (node, offset);
        }
        let next_token = token_from(self.bytes, peek_offset);

        if next_token.kind == TokenKind::RESERVED && next_token.raw_string.as_bytes() == b":" {
            offset = peek_offset + next_token.len();
            let child_offset = self.skip_irregular(offset);
            // A closer or separator right after ':' means there's no child element at all --
            // that's the one recoverable error here, and the terminating token must stay
            // unconsumed so the enclosing set still closes (or the separator still attaches
            // its IsBefore/IsAfter flags) normally.
            let terminates_here = child_offset >= self.bytes.len() || {
                let candidate = token_from(self.bytes, child_offset);
                Self::is_separator(&candidate)
                    || (candidate.kind == TokenKind::RESERVED && matches!(candidate.raw_string.as_bytes()[0], b')' | b']' | b'}'))
            };
            if terminates_here {
                self.push_message(node, MessageKind::Error, "expected an element after ':'");
                return (node, child_offset);
            }
            match self.parse_next_element(node, offset, NodeFlags::NONE, expected_closer) {
                NextElement::Node(_child, new_offset) => offset = new_offset,
                NextElement::Eof(eof_offset) | NextElement::Closer(eof_offset) | NextElement::Mismatched(eof_offset) => {
                    self.push_message(node, MessageKind::Error, "expected an element after ':'");
                    offset = eof_offset;
                }
                NextElement::Continue(new_offset) => {
                    self.push_message(node, MessageKind::Error, "expected an element after ':'");
                    offset = new_offset;
                }
            }
            return (node, offset);
        }

        if next_token.kind == TokenKind::RESERVED {
            if let Some((close_byte, left_flag)) = delim_info(next_token.raw_string.as_bytes()[0]) {
                let flags = self.arena.node(node).flags.get();
                self.arena.node(node).flags.set(flags | left_flag);
                offset = self.parse_elements(node, peek_offset + next_token.len(), Some(close_byte));
                return (node, offset);
            }
        }

        (node, offset)
    }

    /// Parse exactly one element: its leading tags, its body, and comment attachment. Does
    /// *not* consume a trailing separator — that's [Parser::consume_trailing_separators],
    /// called by [Parser::parse_elements] (and by [parse_one_node_traced] directly) once the
    /// node itself is built.
    fn parse_next_element(&mut self, parent: NodeId, start_offset: usize, pending_after: NodeFlags, expected_closer: Option<u8>) -> NextElement {
        let (offset, prev_comment) = self.skip_irregular_capturing_prev_comment(start_offset);
        if offset >= self.bytes.len() {
            return NextElement::Eof(offset);
        }
        let token = token_from(self.bytes, offset);
        if let Some(result) = self.check_closer(parent, offset, &token, expected_closer) {
            return result;
        }
        if TokenGroups::ERROR.intersects(token.kind) {
            return self.recover_from_bad_token(parent, offset, token, pending_after);
        }
        if Self::is_separator(&token) {
            self.push_message(NodeId::NIL, MessageKind::Warning, "redundant separator");
            return NextElement::Continue(offset + token.len());
        }

        let mut tags: Vec<NodeId> = Vec::new();
        let mut offset = offset;
        loop {
            offset = self.skip_irregular(offset);
            if offset >= self.bytes.len() {
                break;
            }
            let candidate = token_from(self.bytes, offset);
            if !(candidate.kind == TokenKind::SYMBOL && candidate.raw_string.as_bytes() == b"@") {
                break;
            }
            match self.parse_tag(offset) {
                Some((tag, new_offset)) => {
                    tags.push(tag);
                    offset = new_offset;
                }
                None => break,
            }
        }

        offset = self.skip_irregular(offset);
        if offset >= self.bytes.len() {
            self.discard_tags_if_any(&tags);
            return NextElement::Eof(offset);
        }
        let token = token_from(self.bytes, offset);
        if let Some(result) = self.check_closer(parent, offset, &token, expected_closer) {
            self.discard_tags_if_any(&tags);
            return result;
        }
        if Self::is_separator(&token) {
            self.discard_tags_if_any(&tags);
            self.push_message(NodeId::NIL, MessageKind::Warning, "redundant separator");
            return NextElement::Continue(offset + token.len());
        }
        if TokenGroups::ERROR.intersects(token.kind) {
            self.discard_tags_if_any(&tags);
            return self.recover_from_bad_token(parent, offset, token, pending_after);
        }

        let is_label = TokenGroups::LABEL.intersects(token.kind);
        let is_open = token.kind == TokenKind::RESERVED && delim_info(token.raw_string.as_bytes()[0]).is_some();
        if !is_label && !is_open {
            self.discard_tags_if_any(&tags);
            let (marker, msg) = make_token_error(self.arena, token, offset, MessageKind::Error, StringView::from("unexpected token"));
            self.messages.push(self.arena, msg);
            self.apply_prev_comment(marker, prev_comment);
            self.apply_pending_after(marker, pending_after);
            self.arena.push_child(parent, marker);
            return NextElement::Node(marker, offset + token.len().max(1));
        }

        let (node, new_offset) = if is_open {
            self.parse_bare_set(parent, offset)
        } else {
            self.parse_labeled(parent, offset, token, expected_closer)
        };
        for tag in tags {
            self.arena.push_tag(node, tag);
        }
        self.apply_prev_comment(node, prev_comment);
        self.apply_pending_after(node, pending_after);
        let final_offset = self.maybe_attach_next_comment(node, new_offset);
        NextElement::Node(node, final_offset)
    }

    fn discard_tags_if_any(&mut self, tags: &[NodeId]) {
        if !tags.is_empty() {
            self.push_message(NodeId::NIL, MessageKind::Warning, "tags with no following element were discarded");
        }
    }

    /// After a node is built, look for a trailing `,`/`;`, absorbing any further consecutive
    /// separators as redundant (one warning each). Returns the offset to resume from and the
    /// `IsAfter*` flag (if any) the *next* element should receive.
    fn consume_trailing_separators(&mut self, node: NodeId, offset: usize) -> (usize, NodeFlags) {
        let peek = self.skip_irregular(offset);
        if peek >= self.bytes.len() {
            return (offset, NodeFlags::NONE);
        }
        let token = token_from(self.bytes, peek);
        if !Self::is_separator(&token) {
            return (offset, NodeFlags::NONE);
        }

        let separator_byte = token.raw_string.as_bytes()[0];
        let before_flag = Self::before_flag_for(separator_byte);
        let flags = self.arena.node(node).flags.get();
        self.arena.node(node).flags.set(flags | before_flag);
        let mut pending_after = NodeFlags::after_from_before(before_flag);
        let mut cur = peek + token.len();

        loop {
            let next_peek = self.skip_irregular(cur);
            if next_peek >= self.bytes.len() {
                cur = next_peek;
                break;
            }
            let next_token = token_from(self.bytes, next_peek);
            if !Self::is_separator(&next_token) {
                cur = next_peek;
                break;
            }
            self.push_message(node, MessageKind::Warning, "redundant separator");
            let next_byte = next_token.raw_string.as_bytes()[0];
            pending_after = NodeFlags::after_from_before(Self::before_flag_for(next_byte));
            cur = next_peek + next_token.len();
        }
        (cur, pending_after)
    }

    /// Drive a full set/file body: repeatedly parse one element, consume its trailing
    /// separator, and continue until the expected closer is found (or, at file scope, until
    /// end of input). Returns the offset just past whatever ended the loop.
    fn parse_elements(&mut self, parent: NodeId, mut offset: usize, expected_closer: Option<u8>) -> usize {
        let mut pending_after = NodeFlags::NONE;
        loop {
            match self.parse_next_element(parent, offset, pending_after, expected_closer) {
                NextElement::Node(node, new_offset) => {
                    let (advanced, after) = self.consume_trailing_separators(node, new_offset);
                    offset = advanced;
                    pending_after = after;
                }
                NextElement::Continue(new_offset) => {
                    offset = new_offset;
                    pending_after = NodeFlags::NONE;
                }
                NextElement::Closer(closer_offset) => {
                    self.trace(|| format!("parser: closing set at {}", closer_offset));
                    // The left flag was set at open time; the right flag only goes on once
                    // the matching closer is actually consumed, here.
                    if let Some(closer) = expected_closer {
                        let flags = self.arena.node(parent).flags.get();
                        self.arena.node(parent).flags.set(flags | right_flag_for_closer(closer));
                    }
                    return closer_offset + 1;
                }
                NextElement::Mismatched(closer_offset) => {
                    self.push_message(parent, MessageKind::Error, "mismatched closing delimiter");
                    return closer_offset;
                }
                NextElement::Eof(eof_offset) => {
                    if expected_closer.is_some() {
                        self.push_message(
                            parent,
                            MessageKind::CatastrophicError,
                            "unterminated set: missing closing delimiter before end of input",
                        );
                    }
                    return eof_offset;
                }
            }
        }
    }
}

/// An opening delimiter's closing byte and the `HAS_*_LEFT` flag it takes on immediately.
/// The matching `HAS_*_RIGHT` flag is only OR'd in once the closer is actually consumed —
/// see [right_flag_for_closer] and its call site in [Parser::parse_elements].
fn delim_info(open: u8) -> Option<(u8, NodeFlags)> {
    match open {
        b'(' => Some((b')', NodeFlags::HAS_PAREN_LEFT)),
        b'[' => Some((b']', NodeFlags::HAS_BRACKET_LEFT)),
        b'{' => Some((b'}', NodeFlags::HAS_BRACE_LEFT)),
        _ => None,
    }
}

/// The `HAS_*_RIGHT` flag that corresponds to a successfully consumed closing byte.
fn right_flag_for_closer(close: u8) -> NodeFlags {
    match close {
        b')' => NodeFlags::HAS_PAREN_RIGHT,
        b']' => NodeFlags::HAS_BRACKET_RIGHT,
        b'}' => NodeFlags::HAS_BRACE_RIGHT,
        _ => NodeFlags::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::message::MessageKind;

    fn children_strings(arena: &Arena<'_>, node: NodeId) -> Vec<Vec<u8>> {
        arena.children(node).map(|c| arena.node(c).string.as_bytes().to_vec()).collect()
    }

    #[test]
    fn scenario_flat_list_of_labels() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"a b c");
        assert!(result.messages.is_empty());
        assert_eq!(children_strings(&arena, result.node), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn scenario_label_with_attached_set() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"person: { name: \"Ada\", age: 36 }");
        assert!(result.messages.is_empty());
        let person = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(person).string.as_bytes(), b"person");
        let set = arena.child_from_index(person, 0);
        assert_eq!(arena.child_count_from_node(set), 2);
        let name = arena.child_from_index(set, 0);
        assert_eq!(arena.node(name).string.as_bytes(), b"name");
        let name_value = arena.child_from_index(name, 0);
        assert_eq!(arena.node(name_value).string.as_bytes(), b"Ada");
    }

    #[test]
    fn scenario_tags_attach_to_the_node_after_them() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"@deprecated foo");
        assert!(result.messages.is_empty());
        let foo = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(foo).string.as_bytes(), b"foo");
        assert_eq!(arena.tag_count_from_node(foo), 1);
        let tag = arena.tag_from_index(foo, 0);
        assert_eq!(arena.node(tag).string.as_bytes(), b"deprecated");
    }

    #[test]
    fn scenario_tag_with_argument_set() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"@range(0, 10) value");
        assert!(result.messages.is_empty());
        let value = arena.child_from_index(result.node, 0);
        let tag = arena.tag_from_index(value, 0);
        assert_eq!(arena.node(tag).string.as_bytes(), b"range");
        assert_eq!(arena.child_count_from_node(tag), 2);
        assert_eq!(arena.node(arena.child_from_index(tag, 1)).string.as_bytes(), b"10");
    }

    #[test]
    fn scenario_trailing_tags_with_no_node_are_discarded_with_warning() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"@deprecated");
        assert_eq!(result.messages.max_kind, Some(MessageKind::Warning));
        assert_eq!(arena.child_count_from_node(result.node), 0);
    }

    #[test]
    fn scenario_redundant_separator_is_exactly_one_warning() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a, b,, c }");
        assert_eq!(result.messages.count, 1);
        assert_eq!(result.messages.max_kind, Some(MessageKind::Warning));
        let set = arena.child_from_index(result.node, 0);
        assert_eq!(children_strings(&arena, set), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn labeled_child_binds_only_the_element_right_after_colon() {
        // `label: a, b` -- `b` is a sibling of `label`, not of `a`.
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"label: a, b");
        assert!(result.messages.is_empty());
        assert_eq!(children_strings(&arena, result.node), vec![b"label".to_vec(), b"b".to_vec()]);
        let label = arena.child_from_index(result.node, 0);
        assert_eq!(children_strings(&arena, label), vec![b"a".to_vec()]);
    }

    #[test]
    fn separator_flags_are_set_on_both_sides() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"a, b");
        assert!(result.messages.is_empty());
        let a = arena.child_from_index(result.node, 0);
        let b = arena.child_from_index(result.node, 1);
        assert!(arena.node(a).flags.get().contains(NodeFlags::IS_BEFORE_COMMA));
        assert!(arena.node(b).flags.get().contains(NodeFlags::IS_AFTER_COMMA));
    }

    #[test]
    fn mismatched_closing_delimiter_is_reported_without_being_consumed() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a ] b }");
        assert_eq!(result.messages.max_kind, Some(MessageKind::Error));
    }

    #[test]
    fn unterminated_set_is_catastrophic() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a, b");
        assert_eq!(result.messages.max_kind, Some(MessageKind::CatastrophicError));
    }

    #[test]
    fn colon_immediately_followed_by_the_enclosing_closer_recovers_without_eating_it() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a: }");
        assert_eq!(result.messages.count, 1);
        assert_eq!(result.messages.max_kind, Some(MessageKind::Error));
        let set = arena.child_from_index(result.node, 0);
        assert!(arena.node(set).flags.get().contains(NodeFlags::HAS_BRACE_LEFT | NodeFlags::HAS_BRACE_RIGHT));
        let a = arena.child_from_index(set, 0);
        assert_eq!(arena.node(a).string.as_bytes(), b"a");
        assert_eq!(arena.child_count_from_node(a), 0);
    }

    #[test]
    fn colon_immediately_followed_by_a_paren_closer_recovers() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"( a: )");
        assert_eq!(result.messages.count, 1);
        assert_eq!(result.messages.max_kind, Some(MessageKind::Error));
        let outer = arena.child_from_index(result.node, 0);
        assert!(arena.node(outer).flags.get().contains(NodeFlags::HAS_PAREN_LEFT | NodeFlags::HAS_PAREN_RIGHT));
    }

    #[test]
    fn colon_followed_by_mismatched_closer_is_left_unconsumed_and_right_flag_stays_off() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a: ] }");
        assert_ne!(result.messages.max_kind, Some(MessageKind::CatastrophicError));
        let set = arena.child_from_index(result.node, 0);
        assert!(arena.node(set).flags.get().contains(NodeFlags::HAS_BRACE_LEFT));
        assert!(!arena.node(set).flags.get().contains(NodeFlags::HAS_BRACE_RIGHT));
    }

    #[test]
    fn colon_immediately_followed_by_a_separator_recovers_without_a_redundant_separator_warning() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a:, b }");
        assert_eq!(result.messages.count, 1);
        assert_eq!(result.messages.max_kind, Some(MessageKind::Error));

        let set = arena.child_from_index(result.node, 0);
        let a = arena.child_from_index(set, 0);
        let b = arena.child_from_index(set, 1);
        assert!(arena.node(a).flags.get().contains(NodeFlags::IS_BEFORE_COMMA));
        assert!(arena.node(b).flags.get().contains(NodeFlags::IS_AFTER_COMMA));
    }

    #[test]
    fn genuinely_unterminated_set_after_a_dangling_colon_is_still_catastrophic() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ a:");
        assert_eq!(result.messages.max_kind, Some(MessageKind::CatastrophicError));
    }

    #[test]
    fn unterminated_bare_set_never_gets_the_right_flag() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"(a");
        let set = arena.child_from_index(result.node, 0);
        assert!(arena.node(set).flags.get().contains(NodeFlags::HAS_PAREN_LEFT));
        assert!(!arena.node(set).flags.get().contains(NodeFlags::HAS_PAREN_RIGHT));
    }

    #[test]
    fn prev_comment_attaches_only_across_a_blank_line_free_gap() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"// doc\nfoo");
        let foo = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(foo).prev_comment.get().as_bytes(), b" doc");
    }

    #[test]
    fn prev_comment_does_not_cross_a_blank_line() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"// doc\n\nfoo");
        let foo = arena.child_from_index(result.node, 0);
        assert!(arena.node(foo).prev_comment.get().is_empty());
    }

    #[test]
    fn next_comment_attaches_to_a_same_line_trailing_comment() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"foo // trailing\nbar");
        let foo = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(foo).next_comment.get().as_bytes(), b" trailing");
    }

    #[test]
    fn bad_character_becomes_an_error_marker_and_parsing_continues() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", "a \u{1}b".as_bytes());
        assert_eq!(result.messages.max_kind, Some(MessageKind::Error));
        assert_eq!(arena.child_count_from_node(result.node), 3);
        let marker = arena.child_from_index(result.node, 1);
        assert_eq!(arena.node(marker).kind, NodeKind::ErrorMarker);
    }

    #[test]
    fn parse_one_node_stops_after_a_single_element() {
        let mut arena = Arena::new();
        let bytes: &[u8] = b"foo bar";
        let result = parse_one_node(&mut arena, bytes, 0);
        assert_eq!(arena.node(result.node).string.as_bytes(), b"foo");
        assert_eq!(result.string_advance, 3);
        assert!(arena.node(result.node).parent.get().is_nil());
    }

    #[test]
    fn empty_input_parses_to_a_childless_file() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"");
        assert!(result.messages.is_empty());
        assert_eq!(arena.child_count_from_node(result.node), 0);
    }

    #[test]
    fn raw_string_covers_leaves_exactly() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"foo_123");
        let foo = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(foo).raw_string.as_bytes(), b"foo_123");
    }

    #[test]
    fn nested_bare_sets_of_every_bracket_kind() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"{ [ ( x ) ] }");
        assert!(result.messages.is_empty());
        let brace = arena.child_from_index(result.node, 0);
        assert!(arena.node(brace).flags.get().contains(NodeFlags::HAS_BRACE_LEFT | NodeFlags::HAS_BRACE_RIGHT));
        let bracket = arena.child_from_index(brace, 0);
        assert!(arena.node(bracket).flags.get().contains(NodeFlags::HAS_BRACKET_LEFT | NodeFlags::HAS_BRACKET_RIGHT));
        let paren = arena.child_from_index(bracket, 0);
        assert!(arena.node(paren).flags.get().contains(NodeFlags::HAS_PAREN_LEFT | NodeFlags::HAS_PAREN_RIGHT));
        let x = arena.child_from_index(paren, 0);
        assert_eq!(arena.node(x).string.as_bytes(), b"x");
    }

    #[test]
    fn a_label_immediately_followed_by_a_set_attaches_it_without_a_colon() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"point (1, 2)");
        assert!(result.messages.is_empty());
        let point = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(point).string.as_bytes(), b"point");
        assert_eq!(children_strings(&arena, point), vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn scenario_label_with_numeric_child_and_no_messages() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"foo: 123");
        assert!(result.messages.is_empty());
        let foo = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(foo).string.as_bytes(), b"foo");
        assert!(arena.node(foo).flags.get().contains(NodeFlags::IDENTIFIER));
        let value = arena.child_from_index(foo, 0);
        assert_eq!(arena.node(value).string.as_bytes(), b"123");
        assert!(arena.node(value).flags.get().contains(NodeFlags::NUMERIC));
    }

    #[test]
    fn scenario_tagged_label_with_brace_set_and_semicolons() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"@tag(1,2) name {a; b; c}");
        assert!(result.messages.is_empty());
        let name = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(name).string.as_bytes(), b"name");
        assert!(arena.node(name).flags.get().contains(NodeFlags::HAS_BRACE_LEFT | NodeFlags::HAS_BRACE_RIGHT));

        let tag = arena.tag_from_index(name, 0);
        assert_eq!(arena.node(tag).string.as_bytes(), b"tag");
        assert_eq!(children_strings(&arena, tag), vec![b"1".to_vec(), b"2".to_vec()]);

        assert_eq!(children_strings(&arena, name), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        let a = arena.child_from_index(name, 0);
        let b = arena.child_from_index(name, 1);
        let c = arena.child_from_index(name, 2);
        assert!(arena.node(a).flags.get().contains(NodeFlags::IS_BEFORE_SEMICOLON));
        assert!(arena.node(b).flags.get().contains(NodeFlags::IS_BEFORE_SEMICOLON));
        assert!(!arena.node(c).flags.get().contains(NodeFlags::IS_BEFORE_SEMICOLON));
    }

    #[test]
    fn scenario_triplet_string_at_top_level() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"\"\"\"multi\nline\"\"\"");
        assert!(result.messages.is_empty());
        assert_eq!(arena.child_count_from_node(result.node), 1);
        let value = arena.child_from_index(result.node, 0);
        assert_eq!(arena.node(value).string.as_bytes(), b"multi\nline");
        assert!(arena.node(value).flags.get().contains(NodeFlags::STRING_LITERAL | NodeFlags::STRING_TRIPLET | NodeFlags::STRING_DOUBLE_QUOTE));
        assert_eq!(arena.node(value).raw_string.as_bytes(), b"\"\"\"multi\nline\"\"\"");
    }

    #[test]
    fn scenario_unterminated_string_child_becomes_error_marker() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"foo: \"unterminated");
        assert_eq!(result.messages.max_kind, Some(MessageKind::Error));
        let foo = arena.child_from_index(result.node, 0);
        assert_eq!(arena.child_count_from_node(foo), 1);
        let child = arena.child_from_index(foo, 0);
        assert_eq!(arena.node(child).kind, NodeKind::ErrorMarker);
    }

    #[test]
    fn scenario_two_tags_in_order_with_no_children_of_their_own() {
        let mut arena = Arena::new();
        let result = parse_whole_string(&mut arena, "f.md", b"@x @y name");
        assert!(result.messages.is_empty());
        let name = arena.child_from_index(result.node, 0);
        assert_eq!(arena.tag_count_from_node(name), 2);
        let x = arena.tag_from_index(name, 0);
        let y = arena.tag_from_index(name, 1);
        assert_eq!(arena.node(x).string.as_bytes(), b"x");
        assert_eq!(arena.node(y).string.as_bytes(), b"y");
        assert_eq!(arena.child_count_from_node(x), 0);
        assert_eq!(arena.child_count_from_node(y), 0);
    }
}
