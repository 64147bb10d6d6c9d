//! This module contains token kind declarations
//! and a Logos-based lexer implementation for the host language.
//!
//! The host grammar is extended with three marker bytes that are not
//! part of it: `$` (shell), `#` (math) and `@` (matrix multiply /
//! remote-host prefix). They lex as their own kinds so that the mode
//! classifier can dispatch on them.

#![allow(clippy::manual_non_exhaustive)]
#![allow(non_camel_case_types)]

use logos::{Lexer as LogosLexer, Logos};
use serde::{Deserialize, Serialize};

/// `SyntaxKind` represents all the token types (kinds) found in the grammar.
#[derive(
    Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u16)]
pub enum SyntaxKind {
    // region: Keywords
    #[token("break")]
    KW_BREAK,
    #[token("case")]
    KW_CASE,
    #[token("chan")]
    KW_CHAN,
    #[token("const")]
    KW_CONST,
    #[token("continue")]
    KW_CONTINUE,
    #[token("default")]
    KW_DEFAULT,
    #[token("defer")]
    KW_DEFER,
    #[token("else")]
    KW_ELSE,
    #[token("fallthrough")]
    KW_FALLTHROUGH,
    #[token("for")]
    KW_FOR,
    #[token("func")]
    KW_FUNC,
    #[token("go")]
    KW_GO,
    #[token("goto")]
    KW_GOTO,
    #[token("if")]
    KW_IF,
    #[token("import")]
    KW_IMPORT,
    #[token("interface")]
    KW_INTERFACE,
    #[token("map")]
    KW_MAP,
    #[token("package")]
    KW_PACKAGE,
    #[token("range")]
    KW_RANGE,
    #[token("return")]
    KW_RETURN,
    #[token("select")]
    KW_SELECT,
    #[token("struct")]
    KW_STRUCT,
    #[token("switch")]
    KW_SWITCH,
    #[token("type")]
    KW_TYPE,
    #[token("var")]
    KW_VAR,
    // endregion

    // region: Punctuation
    #[token(",")]
    PUNCT_COMMA,
    #[token(";")]
    PUNCT_SEMI,
    #[token(":")]
    PUNCT_COLON,
    #[token(".")]
    PUNCT_DOT,
    #[token("...")]
    PUNCT_ELLIPSIS,

    #[token("(")]
    PUNCT_PAREN_START,
    #[token(")")]
    PUNCT_PAREN_END,

    #[token("[")]
    PUNCT_BRACKET_START,
    #[token("]")]
    PUNCT_BRACKET_END,

    #[token("{")]
    PUNCT_BRACE_START,
    #[token("}")]
    PUNCT_BRACE_END,
    // endregion

    // region: Operators
    #[token("+")]
    OP_ADD,
    #[token("-")]
    OP_SUB,
    #[token("*")]
    OP_MUL,
    #[token("/")]
    OP_DIV,
    #[token("%")]
    OP_REM,
    #[token("**")]
    OP_POW,

    #[token("&")]
    OP_AND,
    #[token("|")]
    OP_OR,
    #[token("^")]
    OP_XOR,
    #[token("&^")]
    OP_AND_NOT,
    #[token("<<")]
    OP_SHL,
    #[token(">>")]
    OP_SHR,

    #[token("=")]
    OP_ASSIGN,
    #[token(":=")]
    OP_DEFINE,
    #[token("+=")]
    OP_ADD_ASSIGN,
    #[token("-=")]
    OP_SUB_ASSIGN,
    #[token("*=")]
    OP_MUL_ASSIGN,
    #[token("/=")]
    OP_DIV_ASSIGN,
    #[token("%=")]
    OP_REM_ASSIGN,
    #[token("&=")]
    OP_AND_ASSIGN,
    #[token("|=")]
    OP_OR_ASSIGN,
    #[token("^=")]
    OP_XOR_ASSIGN,
    #[token("<<=")]
    OP_SHL_ASSIGN,
    #[token(">>=")]
    OP_SHR_ASSIGN,
    #[token("&^=")]
    OP_AND_NOT_ASSIGN,

    #[token("==")]
    OP_EQ,
    #[token("!=")]
    OP_NOT_EQ,
    #[token("<")]
    OP_LT,
    #[token("<=")]
    OP_LT_EQ,
    #[token(">")]
    OP_GT,
    #[token(">=")]
    OP_GT_EQ,

    #[token("&&")]
    OP_BOOL_AND,
    #[token("||")]
    OP_BOOL_OR,
    #[token("!")]
    OP_NOT,

    #[token("++")]
    OP_INC,
    #[token("--")]
    OP_DEC,
    #[token("<-")]
    OP_ARROW,
    // endregion

    // region: Mode markers
    // Bytes outside the host grammar that delimit the embedded
    // sublanguages.
    #[token("$")]
    DOLLAR,
    #[token("#")]
    HASH,
    #[token("@")]
    AT,
    // endregion

    // region: Literals
    #[regex(r"[0-9][0-9_]*", priority = 3)]
    #[regex(r"0x[0-9A-Fa-f_]+")]
    #[regex(r"0o[0-7_]+")]
    #[regex(r"0b[01_]+")]
    LIT_INT,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?", priority = 2)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    LIT_FLOAT,

    #[token(r#"""#, |lex| {
        // Walk to the closing quote; a backslash shields whatever
        // byte follows it.
        let bytes = lex.remainder().as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    lex.bump(i + 1);
                    return Some(());
                }
                _ => i += 1,
            }
        }
        None
    })]
    #[token("`", |lex| {
        // Raw strings have no escapes, the next backtick terminates.
        let end = lex.remainder().find('`')?;
        lex.bump(end + 1);
        Some(())
    })]
    LIT_STR,

    #[regex(r#"'\\.'|'.'|'\\x[A-Fa-f0-9][A-Fa-f0-9]'|'\\u[A-Fa-f0-9][A-Fa-f0-9][A-Fa-f0-9][A-Fa-f0-9]'"#)]
    LIT_CHAR,
    // endregion

    // region: Other
    #[regex(r"#![^\n\r]*")]
    SHEBANG,

    #[regex("[A-Za-z_][0-9A-Za-z_]*")]
    IDENT,

    #[regex(r"//[^\n\r]*")]
    COMMENT_LINE,

    #[token("/*", lex_block_comment)]
    COMMENT_BLOCK,

    #[regex(r"[ \t\n\r\f]+")]
    WHITESPACE,
    #[error]
    ERROR,
    // endregion

    // A marker to safely cast between u16 and syntax kinds.
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Whether the kind is a host keyword.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        self >= KW_BREAK && self <= KW_VAR
    }

    /// Whether the kind is a literal token.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, LIT_INT | LIT_FLOAT | LIT_STR | LIT_CHAR)
    }

    /// Whether the kind is one of the sublanguage marker bytes.
    #[must_use]
    pub fn is_marker(self) -> bool {
        matches!(self, DOLLAR | HASH | AT)
    }

    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(self, COMMENT_LINE | COMMENT_BLOCK)
    }

    /// `=`, `+=`, `-=`, `*=`, `/=` and friends.
    #[must_use]
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            OP_ASSIGN
                | OP_ADD_ASSIGN
                | OP_SUB_ASSIGN
                | OP_MUL_ASSIGN
                | OP_DIV_ASSIGN
                | OP_REM_ASSIGN
                | OP_AND_ASSIGN
                | OP_OR_ASSIGN
                | OP_XOR_ASSIGN
                | OP_SHL_ASSIGN
                | OP_SHR_ASSIGN
                | OP_AND_NOT_ASSIGN
        )
    }

    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(self, OP_EQ | OP_NOT_EQ | OP_LT | OP_LT_EQ | OP_GT | OP_GT_EQ)
    }

    /// The source text of the kind, for kinds whose text is fixed.
    #[must_use]
    pub fn static_text(self) -> Option<&'static str> {
        let text = match self {
            KW_BREAK => "break",
            KW_CASE => "case",
            KW_CHAN => "chan",
            KW_CONST => "const",
            KW_CONTINUE => "continue",
            KW_DEFAULT => "default",
            KW_DEFER => "defer",
            KW_ELSE => "else",
            KW_FALLTHROUGH => "fallthrough",
            KW_FOR => "for",
            KW_FUNC => "func",
            KW_GO => "go",
            KW_GOTO => "goto",
            KW_IF => "if",
            KW_IMPORT => "import",
            KW_INTERFACE => "interface",
            KW_MAP => "map",
            KW_PACKAGE => "package",
            KW_RANGE => "range",
            KW_RETURN => "return",
            KW_SELECT => "select",
            KW_STRUCT => "struct",
            KW_SWITCH => "switch",
            KW_TYPE => "type",
            KW_VAR => "var",
            PUNCT_COMMA => ",",
            PUNCT_SEMI => ";",
            PUNCT_COLON => ":",
            PUNCT_DOT => ".",
            PUNCT_ELLIPSIS => "...",
            PUNCT_PAREN_START => "(",
            PUNCT_PAREN_END => ")",
            PUNCT_BRACKET_START => "[",
            PUNCT_BRACKET_END => "]",
            PUNCT_BRACE_START => "{",
            PUNCT_BRACE_END => "}",
            OP_ADD => "+",
            OP_SUB => "-",
            OP_MUL => "*",
            OP_DIV => "/",
            OP_REM => "%",
            OP_POW => "**",
            OP_AND => "&",
            OP_OR => "|",
            OP_XOR => "^",
            OP_AND_NOT => "&^",
            OP_SHL => "<<",
            OP_SHR => ">>",
            OP_ASSIGN => "=",
            OP_DEFINE => ":=",
            OP_ADD_ASSIGN => "+=",
            OP_SUB_ASSIGN => "-=",
            OP_MUL_ASSIGN => "*=",
            OP_DIV_ASSIGN => "/=",
            OP_REM_ASSIGN => "%=",
            OP_AND_ASSIGN => "&=",
            OP_OR_ASSIGN => "|=",
            OP_XOR_ASSIGN => "^=",
            OP_SHL_ASSIGN => "<<=",
            OP_SHR_ASSIGN => ">>=",
            OP_AND_NOT_ASSIGN => "&^=",
            OP_EQ => "==",
            OP_NOT_EQ => "!=",
            OP_LT => "<",
            OP_LT_EQ => "<=",
            OP_GT => ">",
            OP_GT_EQ => ">=",
            OP_BOOL_AND => "&&",
            OP_BOOL_OR => "||",
            OP_NOT => "!",
            OP_INC => "++",
            OP_DEC => "--",
            OP_ARROW => "<-",
            DOLLAR => "$",
            HASH => "#",
            AT => "@",
            _ => return None,
        };

        Some(text)
    }
}

/// One lexed token: its kind, its source slice, and the byte offset
/// it starts at.
#[derive(Debug, Clone, Copy)]
pub struct Lexed<'source> {
    pub kind: SyntaxKind,
    pub text: &'source str,
    pub start: usize,
}

/// An iterator over the raw Logos lexer that pairs every kind with
/// its slice and position.
pub struct Lexer<'source> {
    inner: LogosLexer<'source, SyntaxKind>,
}

impl<'source> Lexer<'source> {
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: SyntaxKind::lexer(source),
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Lexed<'source>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.inner.next()?;
        Some(Lexed {
            kind,
            text: self.inner.slice(),
            start: self.inner.span().start,
        })
    }
}

// Block comments do not nest in the host grammar and may be left
// unterminated at the end of a chunk, so `/*` hands off to a callback
// instead of a pattern.
#[allow(clippy::unnecessary_wraps)]
fn lex_block_comment(lex: &mut LogosLexer<SyntaxKind>) -> Option<()> {
    let consumed = match lex.remainder().find("*/") {
        Some(end) => end + 2,
        None => lex.remainder().len(),
    };
    lex.bump(consumed);

    Some(())
}

/// A macro for using tokens in a more humanly way, e.g. `T!["="]`.
#[macro_export]
macro_rules! T {
    ["break"] => { $crate::syntax::SyntaxKind::KW_BREAK };
    ["case"] => { $crate::syntax::SyntaxKind::KW_CASE };
    ["chan"] => { $crate::syntax::SyntaxKind::KW_CHAN };
    ["const"] => { $crate::syntax::SyntaxKind::KW_CONST };
    ["continue"] => { $crate::syntax::SyntaxKind::KW_CONTINUE };
    ["default"] => { $crate::syntax::SyntaxKind::KW_DEFAULT };
    ["defer"] => { $crate::syntax::SyntaxKind::KW_DEFER };
    ["else"] => { $crate::syntax::SyntaxKind::KW_ELSE };
    ["fallthrough"] => { $crate::syntax::SyntaxKind::KW_FALLTHROUGH };
    ["for"] => { $crate::syntax::SyntaxKind::KW_FOR };
    ["func"] => { $crate::syntax::SyntaxKind::KW_FUNC };
    ["go"] => { $crate::syntax::SyntaxKind::KW_GO };
    ["goto"] => { $crate::syntax::SyntaxKind::KW_GOTO };
    ["if"] => { $crate::syntax::SyntaxKind::KW_IF };
    ["import"] => { $crate::syntax::SyntaxKind::KW_IMPORT };
    ["interface"] => { $crate::syntax::SyntaxKind::KW_INTERFACE };
    ["map"] => { $crate::syntax::SyntaxKind::KW_MAP };
    ["package"] => { $crate::syntax::SyntaxKind::KW_PACKAGE };
    ["range"] => { $crate::syntax::SyntaxKind::KW_RANGE };
    ["return"] => { $crate::syntax::SyntaxKind::KW_RETURN };
    ["select"] => { $crate::syntax::SyntaxKind::KW_SELECT };
    ["struct"] => { $crate::syntax::SyntaxKind::KW_STRUCT };
    ["switch"] => { $crate::syntax::SyntaxKind::KW_SWITCH };
    ["type"] => { $crate::syntax::SyntaxKind::KW_TYPE };
    ["var"] => { $crate::syntax::SyntaxKind::KW_VAR };
    [","] => { $crate::syntax::SyntaxKind::PUNCT_COMMA };
    [";"] => { $crate::syntax::SyntaxKind::PUNCT_SEMI };
    [":"] => { $crate::syntax::SyntaxKind::PUNCT_COLON };
    ["."] => { $crate::syntax::SyntaxKind::PUNCT_DOT };
    ["..."] => { $crate::syntax::SyntaxKind::PUNCT_ELLIPSIS };
    ["("] => { $crate::syntax::SyntaxKind::PUNCT_PAREN_START };
    [")"] => { $crate::syntax::SyntaxKind::PUNCT_PAREN_END };
    ["["] => { $crate::syntax::SyntaxKind::PUNCT_BRACKET_START };
    ["]"] => { $crate::syntax::SyntaxKind::PUNCT_BRACKET_END };
    ["{"] => { $crate::syntax::SyntaxKind::PUNCT_BRACE_START };
    ["}"] => { $crate::syntax::SyntaxKind::PUNCT_BRACE_END };
    ["+"] => { $crate::syntax::SyntaxKind::OP_ADD };
    ["-"] => { $crate::syntax::SyntaxKind::OP_SUB };
    ["*"] => { $crate::syntax::SyntaxKind::OP_MUL };
    ["/"] => { $crate::syntax::SyntaxKind::OP_DIV };
    ["%"] => { $crate::syntax::SyntaxKind::OP_REM };
    ["**"] => { $crate::syntax::SyntaxKind::OP_POW };
    ["&"] => { $crate::syntax::SyntaxKind::OP_AND };
    ["|"] => { $crate::syntax::SyntaxKind::OP_OR };
    ["^"] => { $crate::syntax::SyntaxKind::OP_XOR };
    ["&^"] => { $crate::syntax::SyntaxKind::OP_AND_NOT };
    ["<<"] => { $crate::syntax::SyntaxKind::OP_SHL };
    [">>"] => { $crate::syntax::SyntaxKind::OP_SHR };
    ["="] => { $crate::syntax::SyntaxKind::OP_ASSIGN };
    [":="] => { $crate::syntax::SyntaxKind::OP_DEFINE };
    ["+="] => { $crate::syntax::SyntaxKind::OP_ADD_ASSIGN };
    ["-="] => { $crate::syntax::SyntaxKind::OP_SUB_ASSIGN };
    ["*="] => { $crate::syntax::SyntaxKind::OP_MUL_ASSIGN };
    ["/="] => { $crate::syntax::SyntaxKind::OP_DIV_ASSIGN };
    ["%="] => { $crate::syntax::SyntaxKind::OP_REM_ASSIGN };
    ["&="] => { $crate::syntax::SyntaxKind::OP_AND_ASSIGN };
    ["|="] => { $crate::syntax::SyntaxKind::OP_OR_ASSIGN };
    ["^="] => { $crate::syntax::SyntaxKind::OP_XOR_ASSIGN };
    ["<<="] => { $crate::syntax::SyntaxKind::OP_SHL_ASSIGN };
    [">>="] => { $crate::syntax::SyntaxKind::OP_SHR_ASSIGN };
    ["&^="] => { $crate::syntax::SyntaxKind::OP_AND_NOT_ASSIGN };
    ["=="] => { $crate::syntax::SyntaxKind::OP_EQ };
    ["!="] => { $crate::syntax::SyntaxKind::OP_NOT_EQ };
    ["<"] => { $crate::syntax::SyntaxKind::OP_LT };
    ["<="] => { $crate::syntax::SyntaxKind::OP_LT_EQ };
    [">"] => { $crate::syntax::SyntaxKind::OP_GT };
    [">="] => { $crate::syntax::SyntaxKind::OP_GT_EQ };
    ["&&"] => { $crate::syntax::SyntaxKind::OP_BOOL_AND };
    ["||"] => { $crate::syntax::SyntaxKind::OP_BOOL_OR };
    ["!"] => { $crate::syntax::SyntaxKind::OP_NOT };
    ["++"] => { $crate::syntax::SyntaxKind::OP_INC };
    ["--"] => { $crate::syntax::SyntaxKind::OP_DEC };
    ["<-"] => { $crate::syntax::SyntaxKind::OP_ARROW };
    ["$"] => { $crate::syntax::SyntaxKind::DOLLAR };
    ["#"] => { $crate::syntax::SyntaxKind::HASH };
    ["@"] => { $crate::syntax::SyntaxKind::AT };
    ["ident"] => { $crate::syntax::SyntaxKind::IDENT };
    ["lit_int"] => { $crate::syntax::SyntaxKind::LIT_INT };
    ["lit_float"] => { $crate::syntax::SyntaxKind::LIT_FLOAT };
    ["lit_str"] => { $crate::syntax::SyntaxKind::LIT_STR };
    ["lit_char"] => { $crate::syntax::SyntaxKind::LIT_CHAR };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<SyntaxKind> {
        Lexer::new(src)
            .map(|l| l.kind)
            .filter(|k| *k != WHITESPACE)
            .collect()
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            kinds("a := b ** 2 @ c"),
            vec![IDENT, OP_DEFINE, IDENT, OP_POW, LIT_INT, AT, IDENT]
        );
    }

    #[test]
    fn lex_markers() {
        assert_eq!(kinds("$ ls -la $"), vec![DOLLAR, IDENT, OP_SUB, IDENT, DOLLAR]);
        assert_eq!(kinds("# x"), vec![HASH, IDENT]);
        assert_eq!(kinds("##"), vec![HASH, HASH]);
    }

    #[test]
    fn lex_shebang() {
        assert_eq!(kinds("#!/usr/bin/env braid"), vec![SHEBANG]);
    }

    #[test]
    fn lex_literals() {
        assert_eq!(
            kinds(r#"1 1.5 1e9 0x1f "s" `raw` 'c'"#),
            vec![LIT_INT, LIT_FLOAT, LIT_FLOAT, LIT_INT, LIT_STR, LIT_STR, LIT_CHAR]
        );
    }

    #[test]
    fn lex_block_comments() {
        assert_eq!(kinds("a /* note */ b"), vec![IDENT, COMMENT_BLOCK, IDENT]);
        // Comments don't nest: the first `*/` closes.
        assert_eq!(
            kinds("/* a /* b */ c"),
            vec![COMMENT_BLOCK, IDENT]
        );
        // Unterminated comments swallow the rest of the input.
        assert_eq!(kinds("a /* open"), vec![IDENT, COMMENT_BLOCK]);
    }

    #[test]
    fn lex_strings_with_escapes() {
        assert_eq!(kinds(r#""a \" b" x"#), vec![LIT_STR, IDENT]);
        assert_eq!(kinds("`raw \\` x"), vec![LIT_STR, IDENT]);
    }

    #[test]
    fn lex_slice_colons() {
        assert_eq!(
            kinds("a[1:3, ...]"),
            vec![
                IDENT,
                PUNCT_BRACKET_START,
                LIT_INT,
                PUNCT_COLON,
                LIT_INT,
                PUNCT_COMMA,
                PUNCT_ELLIPSIS,
                PUNCT_BRACKET_END
            ]
        );
    }
}
