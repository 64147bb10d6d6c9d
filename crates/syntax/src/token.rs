//! Flat token sequences with source positions, and the utilities the
//! transpiler needs on top of them: bracket matching, depth totals,
//! mode-delimiter scanning and source reconstruction.

use crate::syntax::{Lexer, SyntaxKind, SyntaxKind::*};

/// A single token.
///
/// Tokens produced by [`tokenize`] carry the 1-based byte offset of
/// the token in its source line; tokens manufactured by emitters carry
/// `pos == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: String,
    pub pos: u32,
}

impl Token {
    /// A manufactured token with fixed text implied by its kind.
    #[must_use]
    pub fn punct(kind: SyntaxKind) -> Self {
        Self {
            kind,
            text: String::new(),
            pos: 0,
        }
    }

    /// A manufactured identifier.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            kind: IDENT,
            text: name.into(),
            pos: 0,
        }
    }

    /// A manufactured integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self {
            kind: LIT_INT,
            text: value.to_string(),
            pos: 0,
        }
    }

    /// A manufactured string literal; `text` is quoted and interior
    /// quotes are escaped.
    #[must_use]
    pub fn quoted(text: &str) -> Self {
        let mut s = String::with_capacity(text.len() + 2);
        s.push('"');
        for ch in text.chars() {
            if ch == '"' {
                s.push('\\');
            }
            s.push(ch);
        }
        s.push('"');
        Self {
            kind: LIT_STR,
            text: s,
            pos: 0,
        }
    }

    /// A manufactured string literal whose text already carries its
    /// quotes.
    #[must_use]
    pub fn lit_str(text: impl Into<String>) -> Self {
        Self {
            kind: LIT_STR,
            text: text.into(),
            pos: 0,
        }
    }

    /// The source text of the token.
    #[must_use]
    pub fn text(&self) -> &str {
        if self.text.is_empty() {
            self.kind.static_text().unwrap_or("")
        } else {
            &self.text
        }
    }
}

/// Signed totals of unmatched brackets over a token sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BracketDepths {
    pub paren: i32,
    pub brace: i32,
    pub brack: i32,
}

impl BracketDepths {
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.paren == 0 && self.brace == 0 && self.brack == 0
    }
}

/// An ordered token sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    toks: Vec<Token>,
}

impl Tokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toks.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Token> {
        self.toks.get(idx)
    }

    #[must_use]
    pub fn kind(&self, idx: usize) -> Option<SyntaxKind> {
        self.toks.get(idx).map(|t| t.kind)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Token> {
        self.toks.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.toks.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.toks.iter()
    }

    pub fn push(&mut self, token: Token) {
        self.toks.push(token);
    }

    /// Append a manufactured fixed-text token.
    pub fn tok(&mut self, kind: SyntaxKind) {
        self.toks.push(Token::punct(kind));
    }

    /// Append a manufactured identifier.
    pub fn ident(&mut self, name: impl Into<String>) {
        self.toks.push(Token::ident(name));
    }

    pub fn extend(&mut self, other: Tokens) {
        self.toks.extend(other.toks);
    }

    pub fn extend_from_slice(&mut self, other: &[Token]) {
        self.toks.extend_from_slice(other);
    }

    pub fn insert(&mut self, idx: usize, token: Token) {
        self.toks.insert(idx, token);
    }

    /// Remove a trailing comma, if any.
    pub fn trim_trailing_comma(&mut self) {
        if matches!(self.toks.last(), Some(t) if t.kind == PUNCT_COMMA) {
            self.toks.pop();
        }
    }

    /// Sub-sequence as a new `Tokens`.
    #[must_use]
    pub fn slice(&self, range: std::ops::Range<usize>) -> Tokens {
        Tokens {
            toks: self.toks[range].to_vec(),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Token] {
        &self.toks
    }

    /// For an opening bracket at `idx`, the index of its matching
    /// closer at the same depth. `None` when unmatched or when `idx`
    /// does not hold an opener.
    #[must_use]
    pub fn right_matching(&self, idx: usize) -> Option<usize> {
        let close = match self.kind(idx)? {
            PUNCT_PAREN_START => PUNCT_PAREN_END,
            PUNCT_BRACKET_START => PUNCT_BRACKET_END,
            PUNCT_BRACE_START => PUNCT_BRACE_END,
            _ => return None,
        };
        let open = self.kind(idx)?;

        let mut depth = 0_i32;
        for (i, t) in self.toks.iter().enumerate().skip(idx) {
            if t.kind == open {
                depth += 1;
            } else if t.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }

        None
    }

    /// Signed totals of unmatched brackets over the whole sequence.
    #[must_use]
    pub fn depths(&self) -> BracketDepths {
        let mut d = BracketDepths::default();
        for t in &self.toks {
            match t.kind {
                PUNCT_PAREN_START => d.paren += 1,
                PUNCT_PAREN_END => d.paren -= 1,
                PUNCT_BRACE_START => d.brace += 1,
                PUNCT_BRACE_END => d.brace -= 1,
                PUNCT_BRACKET_START => d.brack += 1,
                PUNCT_BRACKET_END => d.brack -= 1,
                _ => {}
            }
        }
        d
    }

    /// For a mode marker (`$` or `#`) at `idx`, the index of the next
    /// marker of the same kind.
    #[must_use]
    pub fn mode_end(&self, idx: usize) -> Option<usize> {
        let kind = self.kind(idx)?;
        if !matches!(kind, DOLLAR | HASH) {
            return None;
        }

        self.toks
            .iter()
            .enumerate()
            .skip(idx + 1)
            .find(|(_, t)| t.kind == kind)
            .map(|(i, _)| i)
    }

    /// Reconstruct host source text from the sequence.
    ///
    /// Spacing guarantees valid host syntax: identifiers and keywords
    /// are separated, binary operators are spaced, `.` and brackets
    /// abut, block braces are padded while manufactured
    /// composite-literal braces abut their contents.
    #[must_use]
    pub fn code(&self) -> String {
        let mut out = String::new();
        // true entries are manufactured composite-literal braces.
        let mut braces: Vec<bool> = Vec::new();
        let mut prev: Option<&Token> = None;
        let mut prev_unary = false;

        for (i, t) in self.toks.iter().enumerate() {
            let tight = braces.last().copied().unwrap_or(false);

            if t.kind == PUNCT_BRACE_END {
                braces.pop();
            }

            if let Some(p) = prev {
                if !prev_unary && needs_space(p, t, self.toks.get(i + 1), tight) {
                    out.push(' ');
                }
            }
            out.push_str(t.text());

            if t.kind == PUNCT_BRACE_START {
                braces.push(is_tight_brace(prev));
            }

            prev_unary = is_unary_position(prev, t.kind);
            prev = Some(t);
        }

        out
    }
}

impl std::ops::Index<usize> for Tokens {
    type Output = Token;

    fn index(&self, idx: usize) -> &Token {
        &self.toks[idx]
    }
}

impl FromIterator<Token> for Tokens {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            toks: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Tokens {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.toks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.toks.iter()
    }
}

/// Tokenize one source line (or chunk).
///
/// Whitespace is dropped, comments are kept. Bytes outside the grammar
/// come back as `ERROR` tokens carrying their text; the caller decides
/// whether to report them.
#[must_use]
pub fn tokenize(source: &str) -> Tokens {
    let mut toks = Vec::new();

    for lexed in Lexer::new(source) {
        if lexed.kind == WHITESPACE {
            continue;
        }

        toks.push(Token {
            kind: lexed.kind,
            text: lexed.text.to_string(),
            pos: lexed.start as u32 + 1,
        });
    }

    Tokens { toks }
}

/// Whether `kind` acts as a prefix operator here, given the token
/// before it. The operand of a prefix operator abuts it.
fn is_unary_position(prev: Option<&Token>, kind: SyntaxKind) -> bool {
    let could_be_unary = matches!(
        kind,
        OP_ADD | OP_SUB | OP_MUL | OP_AND | OP_NOT | OP_XOR | OP_ARROW
    );
    if !could_be_unary {
        return false;
    }

    !prev.map_or(false, |p| ends_operand(p.kind))
}

fn ends_operand(kind: SyntaxKind) -> bool {
    kind == IDENT
        || kind.is_literal()
        || matches!(
            kind,
            PUNCT_PAREN_END | PUNCT_BRACKET_END | PUNCT_BRACE_END | OP_INC | OP_DEC
        )
}

/// A `{` abuts its head only for manufactured composite literals such
/// as `tensor.Slice{..}`, recognizable by the emitter-made identifier
/// in front. User-written block braces stay padded so statement
/// headers never turn into composite-literal ambiguities.
fn is_tight_brace(prev: Option<&Token>) -> bool {
    prev.map_or(false, |p| p.pos == 0 && p.kind == IDENT)
}

fn needs_space(prev: &Token, cur: &Token, next: Option<&Token>, tight: bool) -> bool {
    match cur.kind {
        PUNCT_COMMA | PUNCT_SEMI | PUNCT_PAREN_END | PUNCT_BRACKET_END | PUNCT_DOT
        | PUNCT_COLON | OP_INC | OP_DEC => return false,
        PUNCT_BRACE_END => return !tight,
        // `args ...string` in a parameter list, but `xs...` when
        // spreading.
        PUNCT_ELLIPSIS => {
            return prev.kind == IDENT && matches!(next.map(|n| n.kind), Some(IDENT));
        }
        PUNCT_BRACE_START => return !is_tight_brace(Some(prev)),
        PUNCT_PAREN_START => {
            return !(ends_operand(prev.kind) || prev.kind == KW_FUNC)
                && !matches!(prev.kind, PUNCT_PAREN_START | PUNCT_BRACKET_START | PUNCT_DOT);
        }
        PUNCT_BRACKET_START => {
            return !(ends_operand(prev.kind) || prev.kind == KW_MAP)
                && !matches!(prev.kind, PUNCT_PAREN_START | PUNCT_BRACKET_START | PUNCT_DOT);
        }
        _ => {}
    }

    match prev.kind {
        PUNCT_PAREN_START | PUNCT_BRACKET_START | PUNCT_DOT | PUNCT_ELLIPSIS => false,
        PUNCT_BRACE_START => !tight,
        PUNCT_COLON => !tight,
        // `]` abuts an element type: `[]any`, `map[string]int`.
        PUNCT_BRACKET_END => !(cur.kind == IDENT || cur.kind.is_keyword()),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::T;
    use pretty_assertions::assert_eq;

    #[test]
    fn reconstruct_call() {
        let mut t = Tokens::new();
        t.ident("runtime");
        t.tok(T!["."]);
        t.ident("Run");
        t.tok(T!["("]);
        t.push(Token::quoted("ls"));
        t.tok(T![","]);
        t.push(Token::quoted("-la"));
        t.tok(T![")"]);
        assert_eq!(t.code(), r#"runtime.Run("ls", "-la")"#);
    }

    #[test]
    fn reconstruct_composite_literal() {
        let mut t = Tokens::new();
        t.ident("tensor");
        t.tok(T!["."]);
        t.ident("Slice");
        t.tok(T!["{"]);
        t.ident("Stop");
        t.tok(T![":"]);
        t.push(Token::int(3));
        t.tok(T!["}"]);
        assert_eq!(t.code(), "tensor.Slice{Stop:3}");
    }

    #[test]
    fn reconstruct_block_brace_padded() {
        // User-written braces keep padding; `if x{` would parse as a
        // composite literal in the host language.
        let t = tokenize("if x > 5 { return }");
        assert_eq!(t.code(), "if x > 5 { return }");
    }

    #[test]
    fn reconstruct_define_and_ops() {
        let t = tokenize("x:=a+1");
        assert_eq!(t.code(), "x := a + 1");
    }

    #[test]
    fn reconstruct_unary() {
        let t = tokenize("y := -x * (a + 1)");
        assert_eq!(t.code(), "y := -x * (a + 1)");
    }

    #[test]
    fn reconstruct_index_abuts() {
        let t = tokenize("a[i][j]");
        assert_eq!(t.code(), "a[i][j]");
    }

    #[test]
    fn right_matching_bracket() {
        let t = tokenize("(a, (b), c) + d");
        assert_eq!(t.right_matching(0), Some(7));
        assert_eq!(t.right_matching(2), Some(4));
        assert_eq!(t.right_matching(1), None);
    }

    #[test]
    fn unmatched_bracket_is_none() {
        let t = tokenize("(a, b");
        assert_eq!(t.right_matching(0), None);
    }

    #[test]
    fn depth_totals() {
        let t = tokenize("f(a[0] { ");
        let d = t.depths();
        assert_eq!((d.paren, d.brace, d.brack), (1, 1, 0));

        let t = tokenize("})");
        let d = t.depths();
        assert_eq!((d.paren, d.brace, d.brack), (-1, -1, 0));
    }

    #[test]
    fn mode_end_scan() {
        let t = tokenize("# a + 1 # * 2");
        assert_eq!(t.mode_end(0), Some(4));

        let t = tokenize("$ ls");
        assert_eq!(t.mode_end(0), None);
    }

    #[test]
    fn positions_are_one_based() {
        let t = tokenize("ab cd");
        assert_eq!(t[0].pos, 1);
        assert_eq!(t[1].pos, 4);
        assert_eq!(Token::ident("x").pos, 0);
    }

    #[test]
    fn trim_trailing_comma() {
        let mut t = tokenize("f(a,");
        t.trim_trailing_comma();
        assert_eq!(t.code(), "f(a");
    }
}
