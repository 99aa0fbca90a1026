//! Bitset types shared by the lexer, the node model, and the string/node search helpers.
//!
//! Each of [TokenKind], [NodeFlags], and [MatchFlags] is a thin wrapper around an unsigned
//! integer. They are kept as distinct types (rather than raw `u32`/`u64`) so that a caller
//! can't accidentally pass a [TokenKind] where a [NodeFlags] was expected, while still
//! supporting the usual bitwise combinators.

use std::fmt::{self, Debug, Display};
use std::ops::{BitAnd, BitOr, BitOrAssign};

macro_rules! bitset {
    ($name:ident, $repr:ty) => {
        #[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(pub $repr);

        impl $name {
            pub const NONE: Self = Self(0);

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Whether `self` and `other` share at least one set bit.
            pub const fn intersects(self, other: Self) -> bool {
                (self.0 & other.0) != 0
            }

            /// Whether every bit set in `other` is also set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }
    };
}

bitset!(TokenKind, u32);

impl TokenKind {
    pub const IDENTIFIER: Self = Self(1 << 0);
    pub const NUMERIC_LITERAL: Self = Self(1 << 1);
    pub const STRING_LITERAL: Self = Self(1 << 2);
    pub const SYMBOL: Self = Self(1 << 3);
    pub const RESERVED: Self = Self(1 << 4);
    pub const COMMENT: Self = Self(1 << 5);
    pub const WHITESPACE: Self = Self(1 << 6);
    pub const NEWLINE: Self = Self(1 << 7);
    pub const BROKEN_COMMENT: Self = Self(1 << 8);
    pub const BROKEN_STRING_LITERAL: Self = Self(1 << 9);
    pub const BAD_CHARACTER: Self = Self(1 << 10);
}

impl Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMED: &[(TokenKind, &str)] = &[
            (TokenKind::IDENTIFIER, "Identifier"),
            (TokenKind::NUMERIC_LITERAL, "NumericLiteral"),
            (TokenKind::STRING_LITERAL, "StringLiteral"),
            (TokenKind::SYMBOL, "Symbol"),
            (TokenKind::RESERVED, "Reserved"),
            (TokenKind::COMMENT, "Comment"),
            (TokenKind::WHITESPACE, "Whitespace"),
            (TokenKind::NEWLINE, "Newline"),
            (TokenKind::BROKEN_COMMENT, "BrokenComment"),
            (TokenKind::BROKEN_STRING_LITERAL, "BrokenStringLiteral"),
            (TokenKind::BAD_CHARACTER, "BadCharacter"),
        ];
        match NAMED.iter().find(|(kind, _)| *kind == *self) {
            Some((_, name)) => f.write_str(name),
            None => write!(f, "TokenKind({:#x})", self.0),
        }
    }
}

/// Bitset groups used to classify a single [TokenKind] for skipping or recovery purposes.
pub struct TokenGroups;

impl TokenGroups {
    pub const WHITESPACE: TokenKind = TokenKind(TokenKind::WHITESPACE.0 | TokenKind::NEWLINE.0);
    pub const COMMENT: TokenKind = TokenKind::COMMENT;
    pub const IRREGULAR: TokenKind = TokenKind(Self::WHITESPACE.0 | Self::COMMENT.0);
    pub const REGULAR: TokenKind = TokenKind(!Self::IRREGULAR.0);
    pub const LABEL: TokenKind = TokenKind(
        TokenKind::IDENTIFIER.0
            | TokenKind::NUMERIC_LITERAL.0
            | TokenKind::STRING_LITERAL.0
            | TokenKind::SYMBOL.0,
    );
    pub const ERROR: TokenKind = TokenKind(
        TokenKind::BROKEN_COMMENT.0
            | TokenKind::BROKEN_STRING_LITERAL.0
            | TokenKind::BAD_CHARACTER.0,
    );
}

bitset!(NodeFlags, u64);

impl NodeFlags {
    // NOTE: every Before/After pair must stay adjacent, Before first, so that a single
    // shift turns a "before" flag into its "after" counterpart (see `after_from_before`).
    pub const HAS_PAREN_LEFT: Self = Self(1 << 0);
    pub const HAS_PAREN_RIGHT: Self = Self(1 << 1);
    pub const HAS_BRACKET_LEFT: Self = Self(1 << 2);
    pub const HAS_BRACKET_RIGHT: Self = Self(1 << 3);
    pub const HAS_BRACE_LEFT: Self = Self(1 << 4);
    pub const HAS_BRACE_RIGHT: Self = Self(1 << 5);

    pub const IS_BEFORE_SEMICOLON: Self = Self(1 << 6);
    pub const IS_AFTER_SEMICOLON: Self = Self(1 << 7);

    pub const IS_BEFORE_COMMA: Self = Self(1 << 8);
    pub const IS_AFTER_COMMA: Self = Self(1 << 9);

    pub const STRING_SINGLE_QUOTE: Self = Self(1 << 10);
    pub const STRING_DOUBLE_QUOTE: Self = Self(1 << 11);
    pub const STRING_TICK: Self = Self(1 << 12);
    pub const STRING_TRIPLET: Self = Self(1 << 13);

    pub const NUMERIC: Self = Self(1 << 14);
    pub const IDENTIFIER: Self = Self(1 << 15);
    pub const STRING_LITERAL: Self = Self(1 << 16);

    /// Turn a `IsBefore*` flag into its `IsAfter*` counterpart. Kept as an explicit lookup
    /// rather than a bare shift at call sites, so the Before/After adjacency invariant only
    /// has to be relied on in one place.
    pub const fn after_from_before(before: Self) -> Self {
        Self(before.0 << 1)
    }
}

impl Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMED: &[(NodeFlags, &str)] = &[
            (NodeFlags::HAS_PAREN_LEFT, "HasParenLeft"),
            (NodeFlags::HAS_PAREN_RIGHT, "HasParenRight"),
            (NodeFlags::HAS_BRACKET_LEFT, "HasBracketLeft"),
            (NodeFlags::HAS_BRACKET_RIGHT, "HasBracketRight"),
            (NodeFlags::HAS_BRACE_LEFT, "HasBraceLeft"),
            (NodeFlags::HAS_BRACE_RIGHT, "HasBraceRight"),
            (NodeFlags::IS_BEFORE_SEMICOLON, "IsBeforeSemicolon"),
            (NodeFlags::IS_AFTER_SEMICOLON, "IsAfterSemicolon"),
            (NodeFlags::IS_BEFORE_COMMA, "IsBeforeComma"),
            (NodeFlags::IS_AFTER_COMMA, "IsAfterComma"),
            (NodeFlags::STRING_SINGLE_QUOTE, "StringSingleQuote"),
            (NodeFlags::STRING_DOUBLE_QUOTE, "StringDoubleQuote"),
            (NodeFlags::STRING_TICK, "StringTick"),
            (NodeFlags::STRING_TRIPLET, "StringTriplet"),
            (NodeFlags::NUMERIC, "Numeric"),
            (NodeFlags::IDENTIFIER, "Identifier"),
            (NodeFlags::STRING_LITERAL, "StringLiteral"),
        ];
        let mut first = true;
        for (flag, name) in NAMED {
            if self.contains(*flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("None")?;
        }
        Ok(())
    }
}

impl Display for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

bitset!(MatchFlags, u32);

impl MatchFlags {
    // General flags occupy the low bits; string-specific flags 4-7; this leaves 8-15 free
    // and lines up with the node-specific range (16+) the node model's own flags start at,
    // so the two bitsets never need to be disambiguated by anything but their type.
    pub const FIND_LAST: Self = Self(1 << 0);
    pub const CASE_INSENSITIVE: Self = Self(1 << 4);
    pub const RIGHT_SIDE_SLOPPY: Self = Self(1 << 5);
    pub const SLASH_INSENSITIVE: Self = Self(1 << 6);
}
