//! Resolving a byte offset into a file into a human-readable line/column, for diagnostics.
//!
//! Line-break positions are computed once per source buffer and cached in a [Code], rather
//! than rescanned on every message — the same approach the teacher's own location-resolution
//! module takes, via a lazily-populated [OnceCell].

use crate::arena::{Arena, NodeId};
use crate::node::NodeKind;
use once_cell::unsync::OnceCell;
use std::fmt;

/// A resolved source location: 1-based line and column, as conventionally printed by a
/// compiler (`file.md:3:7: error: ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeLoc<'n> {
    pub filename: &'n str,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for CodeLoc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A source buffer paired with its filename, plus a lazily computed table of line-break
/// byte offsets. Construct once per parsed file and reuse it for every [CodeLoc] lookup
/// against that file.
pub struct Code<'n> {
    filename: &'n str,
    contents: &'n [u8],
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'n> Code<'n> {
    pub fn new(filename: &'n str, contents: &'n [u8]) -> Self {
        Self {
            filename,
            contents,
            line_breaks: OnceCell::new(),
        }
    }

    fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.contents
                .iter()
                .enumerate()
                .filter(|(_, &b)| b == b'\n')
                .map(|(i, _)| i)
                .collect()
        })
    }

    /// Resolve `offset` (a byte offset into `self.contents`) into a 1-based line/column.
    pub fn loc_from_offset(&self, offset: usize) -> CodeLoc<'n> {
        let line_breaks = self.obtain_line_breaks();
        // Number of newlines strictly before `offset` is the 0-based line index.
        let line_index = line_breaks.partition_point(|&nl| nl < offset);
        let line_start = if line_index == 0 {
            0
        } else {
            line_breaks[line_index - 1] + 1
        };
        CodeLoc {
            filename: self.filename,
            line: line_index + 1,
            column: offset - line_start + 1,
        }
    }
}

/// Resolve `offset` within `contents`, a file named `filename`, into a 1-based line/column.
/// Scans `contents[0..offset]` counting newlines; for repeated lookups against the same
/// buffer prefer building a [Code] once and calling [Code::loc_from_offset] instead.
pub fn code_loc_from_file_offset<'n>(filename: &'n str, contents: &'n [u8], offset: usize) -> CodeLoc<'n> {
    Code::new(filename, contents).loc_from_offset(offset)
}

/// Walk `node` up to its root [NodeKind::File] to recover the filename and source bytes,
/// then resolve `node.offset` against them. The root's `string` holds the filename and its
/// `raw_string` the whole file's contents, per the invariant the parser establishes when it
/// builds a [NodeKind::File] node.
pub fn code_loc_from_node<'s>(arena: &Arena<'s>, node: NodeId) -> CodeLoc<'s> {
    let root = arena.root_from_node(node);
    let root_node = arena.node(root);
    let filename = if root_node.kind == NodeKind::File {
        std::str::from_utf8(root_node.string.as_bytes()).unwrap_or("<invalid-utf8-filename>")
    } else {
        ""
    };
    let contents = root_node.raw_string.as_bytes();
    code_loc_from_file_offset(filename, contents, arena.node(node).offset)
}
