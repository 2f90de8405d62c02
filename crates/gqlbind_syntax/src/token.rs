//! Tokens of the GraphQL type-system language.
//!
//! SDL keywords are contextual. Each one lexes to its own kind so the parser
//! can dispatch on it, but wherever a name is expected a keyword is a name.

use crate::ast::OperationType;
use gqlbind_core::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TokenKind {
    Eof,
    /// Malformed input: bad number, unterminated string, stray character.
    Error,

    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BlockStringLiteral,

    // Definition keywords
    Type,
    Interface,
    Union,
    Enum,
    Input,
    Scalar,
    Schema,
    Extend,
    Implements,

    // Root operation keywords
    Query,
    Mutation,
    Subscription,

    // Value keywords
    True,
    False,
    Null,

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Eq,
    Pipe,
    Amp,
    At,
    Bang,
}

const KEYWORDS: [(&str, TokenKind); 15] = [
    ("type", TokenKind::Type),
    ("interface", TokenKind::Interface),
    ("union", TokenKind::Union),
    ("enum", TokenKind::Enum),
    ("input", TokenKind::Input),
    ("scalar", TokenKind::Scalar),
    ("schema", TokenKind::Schema),
    ("extend", TokenKind::Extend),
    ("implements", TokenKind::Implements),
    ("query", TokenKind::Query),
    ("mutation", TokenKind::Mutation),
    ("subscription", TokenKind::Subscription),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
];

impl TokenKind {
    /// Looks up the keyword spelled exactly `text`.
    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == text)
            .map(|&(_, kind)| kind)
    }

    fn keyword(self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|&(spelling, _)| spelling)
    }

    /// Identifiers and every keyword: `type`, `input` or `null` are all
    /// valid field, argument and enum value names.
    #[must_use]
    pub fn is_name(self) -> bool {
        self == Self::Ident || self.keyword().is_some()
    }

    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::StringLiteral | Self::BlockStringLiteral)
    }

    /// The root operation a `schema { ... }` entry names.
    #[must_use]
    pub const fn operation_type(self) -> Option<OperationType> {
        match self {
            Self::Query => Some(OperationType::Query),
            Self::Mutation => Some(OperationType::Mutation),
            Self::Subscription => Some(OperationType::Subscription),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        if let Some(spelling) = self.keyword() {
            return spelling;
        }
        match self {
            Self::Eof => "<eof>",
            Self::Error => "<error>",
            Self::Ident => "<name>",
            Self::IntLiteral => "<int>",
            Self::FloatLiteral => "<float>",
            Self::StringLiteral | Self::BlockStringLiteral => "<string>",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Colon => ":",
            Self::Eq => "=",
            Self::Pipe => "|",
            Self::Amp => "&",
            Self::At => "@",
            Self::Bang => "!",
            _ => "<keyword>",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    #[inline]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_names() {
        for (spelling, kind) in KEYWORDS {
            assert_eq!(TokenKind::from_keyword(spelling), Some(kind));
            assert_eq!(kind.as_str(), spelling);
            assert!(kind.is_name(), "{spelling}");
        }
        assert!(TokenKind::Ident.is_name());
        assert!(!TokenKind::StringLiteral.is_name());
        assert_eq!(TokenKind::from_keyword("Type"), None);
    }

    #[test]
    fn test_operation_keywords() {
        assert_eq!(TokenKind::Mutation.operation_type(), Some(OperationType::Mutation));
        assert_eq!(TokenKind::Schema.operation_type(), None);
        assert_eq!(TokenKind::Colon.to_string(), ":");
    }
}
