use jolt_core::TextRange;

use crate::names::{is_ident_continue, is_ident_start};
use crate::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) range: TextRange,
    /// Index into [`Lexed::docs`] of a doc comment directly in front of this token.
    pub(crate) doc: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    IntLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    TextBlock,
    At,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Ellipsis,
    ColonColon,
    Colon,
    Question,
    Arrow,
    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    Gt,
    Le,
    Ge,
    AmpAmp,
    PipePipe,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Shl,
    /// Compound assignment other than the shift-right family, which the parser
    /// assembles from `>` tokens.
    AssignOp,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawDoc {
    pub(crate) range: TextRange,
}

#[derive(Debug, Default)]
pub(crate) struct Lexed {
    pub(crate) tokens: Vec<Token>,
    pub(crate) docs: Vec<RawDoc>,
    pub(crate) errors: Vec<Diagnostic>,
}

pub(crate) fn tokenize(text: &str) -> Lexed {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    Lexed {
        tokens,
        docs: lexer.docs,
        errors: lexer.errors,
    }
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    docs: Vec<RawDoc>,
    pending_doc: Option<usize>,
    errors: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            text,
            pos: 0,
            docs: Vec::new(),
            pending_doc: None,
            errors: Vec::new(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.bump_char();
            }

            let rem = self.remaining();
            if rem.starts_with("//") {
                while let Some(c) = self.bump_char() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            if rem.starts_with("/*") {
                let start = self.pos;
                let is_doc = rem.starts_with("/**") && !rem.starts_with("/**/");
                self.pos += 2;
                match self.remaining().find("*/") {
                    Some(end) => self.pos += end + 2,
                    None => {
                        self.pos = self.text.len();
                        self.errors.push(Diagnostic::error(
                            "syntax-error",
                            "unterminated comment",
                            Some(TextRange::new(start, self.pos)),
                        ));
                    }
                }
                if is_doc {
                    self.docs.push(RawDoc {
                        range: TextRange::new(start, self.pos),
                    });
                    self.pending_doc = Some(self.docs.len() - 1);
                }
                continue;
            }

            break;
        }
    }

    fn lex_identifier(&mut self) {
        while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
            self.bump_char();
        }
    }

    fn lex_number(&mut self, first: char) -> TokenKind {
        if first == '0' && matches!(self.peek_char(), Some('x' | 'X' | 'b' | 'B')) {
            self.bump_char();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_hexdigit() || c == '_') {
                self.bump_char();
            }
            if matches!(self.peek_char(), Some('l' | 'L')) {
                self.bump_char();
                return TokenKind::LongLiteral;
            }
            return TokenKind::IntLiteral;
        }

        let mut is_double = first == '.';
        self.eat_digits();
        let member_follows = matches!(
            self.peek_char_n(1),
            Some(c) if c == '.'
                || is_ident_start(c) && !matches!(c, 'e' | 'E' | 'f' | 'F' | 'd' | 'D')
        );
        if !is_double && self.peek_char() == Some('.') && !member_follows {
            self.bump_char();
            is_double = true;
            self.eat_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            is_double = true;
            self.bump_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump_char();
            }
            self.eat_digits();
        }
        match self.peek_char() {
            Some('f' | 'F') => {
                self.bump_char();
                TokenKind::FloatLiteral
            }
            Some('d' | 'D') => {
                self.bump_char();
                TokenKind::DoubleLiteral
            }
            Some('l' | 'L') if !is_double => {
                self.bump_char();
                TokenKind::LongLiteral
            }
            _ if is_double => TokenKind::DoubleLiteral,
            _ => TokenKind::IntLiteral,
        }
    }

    fn eat_digits(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.bump_char();
        }
    }

    /// Lex a quoted literal; the opening quote is already consumed.
    fn lex_quoted(&mut self, start: usize, quote: char) {
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    self.errors.push(Diagnostic::error(
                        "syntax-error",
                        "unterminated literal",
                        Some(TextRange::new(start, self.pos)),
                    ));
                    return;
                }
                Some('\\') => {
                    self.bump_char();
                    self.bump_char();
                }
                Some(c) => {
                    self.bump_char();
                    if c == quote {
                        return;
                    }
                }
            }
        }
    }

    fn lex_text_block(&mut self, start: usize) {
        // Opening `"""` already consumed.
        match self.remaining().find("\"\"\"") {
            Some(end) => self.pos += end + 3,
            None => {
                self.pos = self.text.len();
                self.errors.push(Diagnostic::error(
                    "syntax-error",
                    "unterminated text block",
                    Some(TextRange::new(start, self.pos)),
                ));
            }
        }
    }

    fn punct(&mut self, ch: char) -> TokenKind {
        let next = self.peek_char();
        let next2 = self.peek_char_n(1);
        let (kind, extra) = match (ch, next, next2) {
            ('{', _, _) => (TokenKind::LBrace, 0),
            ('}', _, _) => (TokenKind::RBrace, 0),
            ('(', _, _) => (TokenKind::LParen, 0),
            (')', _, _) => (TokenKind::RParen, 0),
            ('[', _, _) => (TokenKind::LBracket, 0),
            (']', _, _) => (TokenKind::RBracket, 0),
            (';', _, _) => (TokenKind::Semi, 0),
            (',', _, _) => (TokenKind::Comma, 0),
            ('@', _, _) => (TokenKind::At, 0),
            ('?', _, _) => (TokenKind::Question, 0),
            ('~', _, _) => (TokenKind::Tilde, 0),
            ('.', Some('.'), Some('.')) => (TokenKind::Ellipsis, 2),
            ('.', _, _) => (TokenKind::Dot, 0),
            (':', Some(':'), _) => (TokenKind::ColonColon, 1),
            (':', _, _) => (TokenKind::Colon, 0),
            ('=', Some('='), _) => (TokenKind::EqEq, 1),
            ('=', _, _) => (TokenKind::Eq, 0),
            ('!', Some('='), _) => (TokenKind::BangEq, 1),
            ('!', _, _) => (TokenKind::Bang, 0),
            ('<', Some('<'), Some('=')) => (TokenKind::AssignOp, 2),
            ('<', Some('<'), _) => (TokenKind::Shl, 1),
            ('<', Some('='), _) => (TokenKind::Le, 1),
            ('<', _, _) => (TokenKind::Lt, 0),
            ('>', Some('='), _) => (TokenKind::Ge, 1),
            ('>', _, _) => (TokenKind::Gt, 0),
            ('&', Some('&'), _) => (TokenKind::AmpAmp, 1),
            ('&', Some('='), _) => (TokenKind::AssignOp, 1),
            ('&', _, _) => (TokenKind::Amp, 0),
            ('|', Some('|'), _) => (TokenKind::PipePipe, 1),
            ('|', Some('='), _) => (TokenKind::AssignOp, 1),
            ('|', _, _) => (TokenKind::Pipe, 0),
            ('^', Some('='), _) => (TokenKind::AssignOp, 1),
            ('^', _, _) => (TokenKind::Caret, 0),
            ('+', Some('+'), _) => (TokenKind::PlusPlus, 1),
            ('+', Some('='), _) => (TokenKind::AssignOp, 1),
            ('+', _, _) => (TokenKind::Plus, 0),
            ('-', Some('-'), _) => (TokenKind::MinusMinus, 1),
            ('-', Some('='), _) => (TokenKind::AssignOp, 1),
            ('-', Some('>'), _) => (TokenKind::Arrow, 1),
            ('-', _, _) => (TokenKind::Minus, 0),
            ('*', Some('='), _) => (TokenKind::AssignOp, 1),
            ('*', _, _) => (TokenKind::Star, 0),
            ('/', Some('='), _) => (TokenKind::AssignOp, 1),
            ('/', _, _) => (TokenKind::Slash, 0),
            ('%', Some('='), _) => (TokenKind::AssignOp, 1),
            ('%', _, _) => (TokenKind::Percent, 0),
            _ => (TokenKind::Unknown, 0),
        };
        for _ in 0..extra {
            self.bump_char();
        }
        kind
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let ch = self.bump_char()?;

        let kind = match ch {
            '"' if self.remaining().starts_with("\"\"") => {
                self.pos += 2;
                self.lex_text_block(start);
                TokenKind::TextBlock
            }
            '"' => {
                self.lex_quoted(start, '"');
                TokenKind::StringLiteral
            }
            '\'' => {
                self.lex_quoted(start, '\'');
                TokenKind::CharLiteral
            }
            c if c.is_ascii_digit() => self.lex_number(c),
            '.' if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) => {
                self.lex_number('.')
            }
            c if is_ident_start(c) => {
                self.lex_identifier();
                TokenKind::Ident
            }
            other => {
                let kind = self.punct(other);
                if kind == TokenKind::Unknown {
                    self.errors.push(Diagnostic::error(
                        "syntax-error",
                        format!("unexpected character `{other}`"),
                        Some(TextRange::new(start, self.pos)),
                    ));
                }
                kind
            }
        };

        let range = TextRange::new(start, self.pos);
        Some(Token {
            kind,
            text: self.text[start..self.pos].to_string(),
            range,
            doc: self.pending_doc.take(),
        })
    }
}
