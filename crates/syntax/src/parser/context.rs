//! The parser context is a separate module to limit
//! the API surface for the parser functions.

use crate::syntax::SyntaxKind;
use crate::token::{Token, Tokens};

use super::{ParseError, ParseErrorKind};

/// A cursor over one token sequence, comments filtered out.
///
/// It cannot be constructed and can only be obtained via a
/// [`super::Parser`].
#[derive(Debug)]
pub(crate) struct Context<'t> {
    toks: Vec<&'t Token>,
    idx: usize,
}

impl<'t> Context<'t> {
    pub(crate) fn new(tokens: &'t Tokens) -> Self {
        Self {
            toks: tokens.iter().filter(|t| !t.kind.is_comment()).collect(),
            idx: 0,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.idx >= self.toks.len()
    }

    /// The current token, if any.
    pub(crate) fn current(&self) -> Option<&'t Token> {
        self.toks.get(self.idx).copied()
    }

    /// The kind of the current token.
    pub(crate) fn kind(&self) -> Option<SyntaxKind> {
        self.current().map(|t| t.kind)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Consume and return the current token.
    pub(crate) fn bump(&mut self) -> Option<&'t Token> {
        let t = self.current();
        if t.is_some() {
            self.idx += 1;
        }
        t
    }

    /// Consume the current token when it has the given kind.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Result<&'t Token, ParseError> {
        match self.current() {
            Some(t) if t.kind == kind => {
                self.idx += 1;
                Ok(t)
            }
            _ => Err(ParseError::new(
                self.pos(),
                ParseErrorKind::ExpectedToken(kind),
            )),
        }
    }

    /// The byte position of the current token, falling back to the
    /// last token for EOF errors.
    pub(crate) fn pos(&self) -> u32 {
        self.current()
            .or_else(|| self.toks.last().copied())
            .map_or(0, |t| t.pos)
    }

    pub(crate) fn unexpected(&self) -> ParseError {
        let kind = if self.at_end() {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::UnexpectedToken
        };
        ParseError::new(self.pos(), kind)
    }
}
