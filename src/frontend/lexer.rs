use std::io::BufRead;

use super::{
    parser::ParseError,
    tokens::{Token, TokenKind},
};
use crate::ir::unescape;

/// Split the input into lines of tokens.
///
/// Fragments are separated by spaces, tabs are dropped. A string or char
/// literal may contain spaces, its fragments are fused back together with
/// the spaces they were separated by.
pub struct Lexer<R>
where
    R: BufRead,
{
    reader: R,
    /// The number of lines consumed so far.
    line: usize,
}

impl<R> Lexer<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self { Self { reader, line: 0 } }

    /// The line number of the last line returned.
    pub fn line(&self) -> usize { self.line }

    /// Read the next non-empty line.
    ///
    /// At the end of input, a line with a single [TokenKind::Eof] token is
    /// returned, and keeps being returned by later calls.
    pub fn next_line(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(vec![Token::eof(self.line)]);
            }
            self.line += 1;

            let tokens = self.tokenize(&buf)?;
            if !tokens.is_empty() {
                return Ok(tokens);
            }
        }
    }

    fn tokenize(&self, line: &str) -> Result<Vec<Token>, ParseError> {
        let line = line.trim_end_matches(['\n', '\r']);

        // empty fragments are kept, they are the extra spaces of a literal
        let mut fragments = line.split(' ').map(|fragment| fragment.replace('\t', ""));

        let mut tokens = Vec::new();

        while let Some(fragment) = fragments.next() {
            let token = match fragment.chars().next() {
                None => continue,
                Some('"') => self.handle_quoted(fragment, '"', TokenKind::String, &mut fragments)?,
                Some('\'') => self.handle_quoted(fragment, '\'', TokenKind::Char, &mut fragments)?,
                Some('%') => Token::new(TokenKind::Register, &fragment[1..], self.line),
                Some('@') => Token::new(TokenKind::Block, &fragment[1..], self.line),
                Some('$') => Token::new(TokenKind::Global, &fragment[1..], self.line),
                Some(c) if c.is_ascii_digit() || c == '.' => {
                    Token::new(TokenKind::Number, fragment, self.line)
                }
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    Token::new(TokenKind::Identifier, fragment, self.line)
                }
                Some(_) => Token::new(TokenKind::Operator, fragment, self.line),
            };
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Fuse fragments until the literal opened by `first` is closed, then
    /// strip the quotes and resolve the escapes.
    fn handle_quoted(
        &self,
        first: String,
        quote: char,
        kind: TokenKind,
        rest: &mut impl Iterator<Item = String>,
    ) -> Result<Token, ParseError> {
        let mut literal = first;

        while !is_closed(&literal, quote) {
            match rest.next() {
                Some(fragment) => {
                    literal.push(' ');
                    literal.push_str(&fragment);
                }
                None => {
                    return Err(ParseError::UnterminatedLiteral {
                        token: Token::new(kind, literal, self.line),
                    })
                }
            }
        }

        let value = unescape(&literal[1..literal.len() - 1]);
        Ok(Token::new(kind, value, self.line))
    }
}

/// Check if `literal` starts and ends with `quote`, the last one not being
/// escaped by a backslash.
fn is_closed(literal: &str, quote: char) -> bool {
    let body = match literal
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
    {
        Some(body) => body,
        None => return false,
    };
    body.chars().rev().take_while(|c| *c == '\\').count() % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use crate::frontend::{ParseError, Token, TokenKind};

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> { tokens.iter().map(|t| t.kind).collect() }

    fn values(tokens: &[Token]) -> Vec<&str> { tokens.iter().map(|t| t.value.as_str()).collect() }

    #[test]
    fn test_classify() {
        let mut lexer = Lexer::new("%r call + %a num $g @loop 3.5 .5 -1 ? _x\n".as_bytes());
        let tokens = lexer.next_line().unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Register,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Register,
                TokenKind::Identifier,
                TokenKind::Global,
                TokenKind::Block,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Operator,
                TokenKind::Operator,
                TokenKind::Identifier,
            ]
        );
        assert_eq!(
            values(&tokens),
            vec!["r", "call", "+", "a", "num", "g", "loop", "3.5", ".5", "-1", "?", "_x"]
        );
        assert!(tokens.iter().all(|t| t.line == 1));
    }

    #[test]
    fn test_string_fusion() {
        let src = "call printf const str \"hello   big world\"\n";
        let mut lexer = Lexer::new(src.as_bytes());
        let tokens = lexer.next_line().unwrap();

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[4].kind, TokenKind::String);
        // spaces inside the literal are kept as they are
        assert_eq!(tokens[4].value, "hello   big world");
    }

    #[test]
    fn test_escaped_quotes() {
        let src = "\"say \\\"hi\\\" now\" \"C:\\\\new\" \"end\\\\\" ' '\n";
        let mut lexer = Lexer::new(src.as_bytes());
        let tokens = lexer.next_line().unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::String,
                TokenKind::Char,
            ]
        );
        assert_eq!(values(&tokens), vec!["say \"hi\" now", "C:\\new", "end\\", " "]);
    }

    #[test]
    fn test_ascii_identifiers() {
        let mut lexer = Lexer::new("écrire _ok\n".as_bytes());
        let tokens = lexer.next_line().unwrap();
        assert_eq!(kinds(&tokens), vec![TokenKind::Operator, TokenKind::Identifier]);
    }

    #[test]
    fn test_string_escapes() {
        let src = "\"a\\tb\\n\" \"\\q\" \" \" 'x' '\\n'\n";
        let mut lexer = Lexer::new(src.as_bytes());
        let tokens = lexer.next_line().unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::String,
                TokenKind::Char,
                TokenKind::Char,
            ]
        );
        assert_eq!(values(&tokens), vec!["a\tb\n", "\\q", " ", "x", "\n"]);
    }

    #[test]
    fn test_tabs_and_lines() {
        let src = "def num f\n\n\t\tret\t const num 1\n   \nenddef";
        let mut lexer = Lexer::new(src.as_bytes());

        let first = lexer.next_line().unwrap();
        assert_eq!(values(&first), vec!["def", "num", "f"]);

        let second = lexer.next_line().unwrap();
        assert_eq!(values(&second), vec!["ret", "const", "num", "1"]);
        // blank lines are counted
        assert_eq!(second[0].line, 3);

        let third = lexer.next_line().unwrap();
        assert_eq!(values(&third), vec!["enddef"]);
        assert_eq!(third[0].line, 5);

        let eof = lexer.next_line().unwrap();
        assert_eq!(eof.len(), 1);
        assert!(eof[0].is_eof());
        assert!(lexer.next_line().unwrap()[0].is_eof());
    }

    #[test]
    fn test_crlf() {
        let mut lexer = Lexer::new("ret\r\n".as_bytes());
        assert_eq!(values(&lexer.next_line().unwrap()), vec!["ret"]);
    }

    #[test]
    fn test_unterminated() {
        let mut lexer = Lexer::new("const str \"never closed\n".as_bytes());
        assert!(matches!(
            lexer.next_line(),
            Err(ParseError::UnterminatedLiteral { .. })
        ));

        let mut lexer = Lexer::new("\"\n".as_bytes());
        assert!(matches!(
            lexer.next_line(),
            Err(ParseError::UnterminatedLiteral { .. })
        ));

        let mut lexer = Lexer::new("'a\n".as_bytes());
        assert!(matches!(
            lexer.next_line(),
            Err(ParseError::UnterminatedLiteral { token }) if token.kind == TokenKind::Char
        ));
    }
}
