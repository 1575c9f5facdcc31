use std::fmt;

/// The kinds of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input, always alone on its line.
    Eof,
    /// Starts with a letter or `_`, e.g. keywords, type and label names.
    Identifier,
    /// Starts with a digit or `.`.
    Number,
    /// A double-quoted literal, the value is unquoted and unescaped.
    String,
    /// A single-quoted literal, the value is unquoted and unescaped.
    Char,
    /// Anything else, e.g. `+`, `==`, `?` or `-1`.
    Operator,
    /// `%<name>`, the value excludes the prefix.
    Register,
    /// `@<name>`, the value excludes the prefix.
    Block,
    /// `$<name>`, the value excludes the prefix.
    Global,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Char => "CHAR",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Register => "REGISTER",
            TokenKind::Block => "BLOCK",
            TokenKind::Global => "GLOBAL",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// The 1-based line number.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
        }
    }

    pub fn eof(line: usize) -> Self { Self::new(TokenKind::Eof, "", line) }

    pub fn is_eof(&self) -> bool { self.kind == TokenKind::Eof }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ '{}' -> {} ({}) ]", self.value, self.kind, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::{Token, TokenKind};

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Register, "x", 3);
        assert_eq!(format!("{}", token), "[ 'x' -> REGISTER (3) ]");
        assert_eq!(format!("{}", Token::eof(7)), "[ '' -> EOF (7) ]");
    }
}
