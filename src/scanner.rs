use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::{Report, ScanError};
use crate::literal::Literal;
use crate::token::{Location, Token, TokenKind};

/// Turns a source string into a token stream in a single left-to-right
/// pass. Scanning keeps going after an error so several problems can be
/// reported in one run; the driver checks the error flag before parsing.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    /// Char index of the first character of the token being scanned.
    start: usize,
    /// Char index one past the last consumed character.
    current: usize,
    /// Position of `start`, captured before the token body may cross lines.
    start_location: Location,
    line: usize,
    /// Char index of the first character of the current line.
    line_start: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec![],
            start: 0,
            current: 0,
            start_location: Location::new(1, 1),
            line: 1,
            line_start: 0,
        }
    }

    /// Consumes the scanner and returns the token stream, always ending
    /// with an `Eof` token carrying the final position.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            self.start = self.current;
            self.start_location = Location::new(self.line, self.current - self.line_start + 1);
            self.scan_token(c);
        }

        let location = Location::new(self.line, self.current - self.line_start + 1);
        self.tokens.push(Token::new(TokenKind::Eof, "", None, location));
        self.tokens
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),
            '-' => self.single(TokenKind::Minus),
            '+' => self.single(TokenKind::Plus),
            ';' => self.single(TokenKind::Semicolon),
            '*' => self.single(TokenKind::Star),

            '!' => self.single_or_double('=', TokenKind::Bang, TokenKind::BangEqual),
            '=' => self.single_or_double('=', TokenKind::Equal, TokenKind::EqualEqual),
            '<' => self.single_or_double('=', TokenKind::Less, TokenKind::LessEqual),
            '>' => self.single_or_double('=', TokenKind::Greater, TokenKind::GreaterEqual),

            '/' => match self.peek_second() {
                Some('/') => self.line_comment(),
                Some('*') => self.block_comment(),
                _ => self.single(TokenKind::Slash),
            },

            ' ' | '\r' | '\t' => {
                self.advance();
            }

            '\n' => {
                self.advance();
                self.next_line();
            }

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            c => {
                self.advance();
                ScanError {
                    location: self.start_location,
                    message: format!("Unexpected character '{c}'"),
                }
                .report();
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.current += 1;
        }
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.reset_cursor();
        self.chars.peek().copied()
    }

    fn peek_second(&mut self) -> Option<char> {
        self.chars.reset_cursor();
        self.chars.peek_nth(1).copied()
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            return true;
        }
        false
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.line_start = self.current;
    }

    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.source.substring(self.start, self.current);
        self.tokens.push(Token::new(kind, lexeme, literal, self.start_location));
    }

    fn single(&mut self, kind: TokenKind) {
        self.advance();
        self.add_token(kind, None);
    }

    /// Consumes one character, then a second one when it matches
    /// `second`, emitting the one- or two-character token accordingly.
    fn single_or_double(&mut self, second: char, short: TokenKind, long: TokenKind) {
        self.advance();
        if self.advance_if(second) {
            self.add_token(long, None);
        } else {
            self.add_token(short, None);
        }
    }

    fn line_comment(&mut self) {
        while !matches!(self.peek(), Some('\n') | None) {
            self.advance();
        }
    }

    /// Skips `/* ... */`, which may span lines. Block comments do not
    /// nest; the first `*/` ends the comment.
    fn block_comment(&mut self) {
        self.advance();
        self.advance();

        loop {
            match self.peek() {
                Some('*') if self.peek_second() == Some('/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                Some(c) => {
                    self.advance();
                    if c == '\n' {
                        self.next_line();
                    }
                }
                None => {
                    ScanError {
                        location: self.start_location,
                        message: "Unterminated block comment".to_string(),
                    }
                    .report();
                    return;
                }
            }
        }
    }

    /// Scans a `"`-delimited string. Newlines are allowed and there are
    /// no escape sequences; the literal excludes the quotes.
    fn string(&mut self) {
        self.advance();

        loop {
            match self.peek() {
                Some('"') => break,
                Some(c) => {
                    self.advance();
                    if c == '\n' {
                        self.next_line();
                    }
                }
                None => {
                    ScanError {
                        location: self.start_location,
                        message: "Unterminated string".to_string(),
                    }
                    .report();
                    return;
                }
            }
        }

        self.advance();

        let value = self.source.substring(self.start + 1, self.current - 1);
        self.add_token(TokenKind::String, Some(Literal::String(value.to_owned())));
    }

    /// Scans one or more digits with an optional fraction. A trailing `.`
    /// with no digit after it is not part of the number; `123.` scans as
    /// the number `123` followed by a `Dot`.
    fn number(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let lexeme = self.source.substring(self.start, self.current);
        let value = lexeme.parse::<f64>().expect("digit runs to form a valid number");
        self.add_token(TokenKind::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let kind = match self.source.substring(self.start, self.current) {
            "and" => TokenKind::And,
            "break" => TokenKind::Break,
            "class" => TokenKind::Class,
            "else" => TokenKind::Else,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "nil" => TokenKind::Nil,
            "or" => TokenKind::Or,
            "print" => TokenKind::Print,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "var" => TokenKind::Var,
            "while" => TokenKind::While,
            _ => TokenKind::Identifier,
        };

        self.add_token(kind, None);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(
            kinds("(){},.-+;/ *"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn one_and_two_character_operators() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_require_an_exact_match() {
        assert_eq!(
            kinds("or orchid nil nils break breaker"),
            vec![
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Nil,
                TokenKind::Identifier,
                TokenKind::Break,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_literals_parse_as_doubles() {
        let tokens = Scanner::new("3.25 40").scan_tokens();

        assert_eq!(tokens[0].literal, Some(Literal::Number(3.25)));
        assert_eq!(tokens[0].lexeme, "3.25");
        assert_eq!(tokens[1].literal, Some(Literal::Number(40.0)));
    }

    #[test]
    fn trailing_dot_is_not_part_of_the_number() {
        let tokens = Scanner::new("123.").scan_tokens();

        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "123");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }

    #[test]
    fn string_literal_excludes_quotes() {
        let tokens = Scanner::new("\"hello\"").scan_tokens();

        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "\"hello\"");
        assert_eq!(tokens[0].literal, Some(Literal::String("hello".to_owned())));
    }

    #[test]
    fn strings_may_span_lines() {
        let tokens = Scanner::new("\"a\nb\" x").scan_tokens();

        assert_eq!(tokens[0].literal, Some(Literal::String("a\nb".to_owned())));
        // The string starts on line 1; the identifier after it is on line 2.
        assert_eq!(tokens[0].location, Location::new(1, 1));
        assert_eq!(tokens[1].location.line, 2);
    }

    #[test]
    fn comments_produce_no_tokens() {
        assert_eq!(kinds("// all gone\n1"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(
            kinds("/* spanning\ntwo lines */ 1"),
            vec![TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn block_comments_do_not_nest() {
        // The first */ closes the comment, so `rest` is scanned.
        assert_eq!(
            kinds("/* outer /* inner */ rest"),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn locations_are_one_based() {
        let tokens = Scanner::new("a\n  b").scan_tokens();

        assert_eq!(tokens[0].location, Location::new(1, 1));
        assert_eq!(tokens[1].location, Location::new(2, 3));
    }

    #[test]
    fn unterminated_string_produces_no_string_token() {
        let tokens = Scanner::new("\"open").scan_tokens();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
