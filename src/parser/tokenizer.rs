use super::locations::{Location, Span};
use const_format::concatcp;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) lexeme: String,
    pub(crate) span: Span,
}

impl Token {
    pub fn new(typ: TokenType, lexeme: &str, span: Span) -> Self {
        Self {
            typ,
            lexeme: lexeme.to_string(),
            span,
        }
    }

    pub fn typ(&self) -> TokenType {
        self.typ
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[allow(non_camel_case_types)]
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TokenType {
    #[default]
    ILLEGAL,
    EOF,
    IDENT,
    INT,
    STRING,
    ASSIGN,
    PLUS,
    MINUS,
    BANG,
    ASTERISK,
    SLASH,
    LT,
    GT,
    EQ,
    NOT_EQ,
    COMMA,
    SEMICOLON,
    COLON,
    LPAREN,
    RPAREN,
    LBRACE,
    RBRACE,
    LBRACKET,
    RBRACKET,
    FUNCTION,
    LET,
    TRUE,
    FALSE,
    IF,
    ELSE,
    RETURN,
    WHILE,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const EQ: (&str, TokenType) = ("==", TokenType::EQ);
const NOT_EQ: (&str, TokenType) = ("!=", TokenType::NOT_EQ);
const ASSIGN: (&str, TokenType) = ("=", TokenType::ASSIGN);
const PLUS: (&str, TokenType) = ("+", TokenType::PLUS);
const MINUS: (&str, TokenType) = ("-", TokenType::MINUS);
const BANG: (&str, TokenType) = ("!", TokenType::BANG);
const ASTERISK: (&str, TokenType) = ("*", TokenType::ASTERISK);
const SLASH: (&str, TokenType) = ("/", TokenType::SLASH);
const LT: (&str, TokenType) = ("<", TokenType::LT);
const GT: (&str, TokenType) = (">", TokenType::GT);
const COMMA: (&str, TokenType) = (",", TokenType::COMMA);
const SEMICOLON: (&str, TokenType) = (";", TokenType::SEMICOLON);
const COLON: (&str, TokenType) = (":", TokenType::COLON);
const LPAREN: (&str, TokenType) = ("(", TokenType::LPAREN);
const RPAREN: (&str, TokenType) = (")", TokenType::RPAREN);
const LBRACE: (&str, TokenType) = ("{", TokenType::LBRACE);
const RBRACE: (&str, TokenType) = ("}", TokenType::RBRACE);
const LBRACKET: (&str, TokenType) = ("[", TokenType::LBRACKET);
const RBRACKET: (&str, TokenType) = ("]", TokenType::RBRACKET);

// Two-character operators must come before their one-character prefixes.
const SIMPLE_TOKENS: [(&str, TokenType); 19] = [
    EQ, NOT_EQ, ASSIGN, PLUS, MINUS, BANG, ASTERISK, SLASH, LT, GT, COMMA, SEMICOLON, COLON,
    LPAREN, RPAREN, LBRACE, RBRACE, LBRACKET, RBRACKET,
];

macro_rules! alternative {
    ($t:expr) => {{
        $t
    }};
    ($t:expr, $($ts:expr),+) => {{
        concatcp!($t, "|", alternative!($($ts),+))
    }}
}

macro_rules! group {
    ($($ts:expr),+) => {{
        concatcp!(r"(", alternative!($($ts),+), ")")
    }}
}

const S_WHITESPACE: &str = r"^[ \t\r\f]+";
const S_NAME: &str = r"^[A-Za-z_][A-Za-z0-9_]*";
const S_NUMBER: &str = r"^[0-9]+";
const S_KEYWORDS: &str = concatcp!(
    "^",
    group!("fn", "let", "true", "false", "if", "else", "return", "while"),
    r"\b"
);

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_WHITESPACE).expect("Error compiling regex."));
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(S_NAME).expect("Error compiling regex."));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(S_NUMBER).expect("Error compiling regex."));
static KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_KEYWORDS).expect("Error compiling regex."));

fn keyword(lexeme: &str) -> TokenType {
    match lexeme {
        "fn" => TokenType::FUNCTION,
        "let" => TokenType::LET,
        "true" => TokenType::TRUE,
        "false" => TokenType::FALSE,
        "if" => TokenType::IF,
        "else" => TokenType::ELSE,
        "return" => TokenType::RETURN,
        "while" => TokenType::WHILE,
        _ => TokenType::IDENT,
    }
}

/// Line-oriented scanner. String literals may continue across lines, so the
/// scanner keeps the partially read literal between calls to `tokenize_line`.
#[derive(Default)]
pub struct Tokenizer {
    tokens: Vec<Token>,
    line: usize,
    end_of_input: Location,
    in_string: bool,
    current_string: String,
    string_start: Location,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokenize(&mut self, input: impl Iterator<Item = String>) {
        for line in input {
            self.tokenize_line(line.as_str());
        }
    }

    /// Closes the stream: an unterminated string becomes an `ILLEGAL` token,
    /// then the `EOF` sentinel is appended.
    pub fn finalize(mut self) -> Vec<Token> {
        let end = self.end_of_input;
        if self.in_string {
            let lexeme = format!("\"{}", self.current_string);
            let span = Span {
                start: self.string_start,
                end,
            };
            self.tokens.push(Token::new(TokenType::ILLEGAL, &lexeme, span));
        }
        self.tokens
            .push(Token::new(TokenType::EOF, "", Span { start: end, end }));
        self.tokens
    }

    fn tokenize_line(&mut self, line: &str) {
        let lineno = self.line;
        let mut start = 0;

        while start < line.len() {
            let rest = &line[start..];

            if self.in_string {
                match rest.find('"') {
                    Some(end) => {
                        self.current_string.push_str(&rest[..end]);
                        let lexeme = std::mem::take(&mut self.current_string);
                        let span = Span {
                            start: self.string_start,
                            end: Location {
                                line: lineno,
                                column: column(line, start + end + 1),
                            },
                        };
                        self.tokens.push(Token {
                            typ: TokenType::STRING,
                            lexeme,
                            span,
                        });
                        self.in_string = false;
                        start += end + 1;
                    }
                    None => {
                        self.current_string.push_str(rest);
                        start = line.len();
                    }
                }
                continue;
            }

            if let Some(m) = WHITESPACE.find(rest) {
                start += m.end();
                continue;
            }
            if let Some(m) = KEYWORDS.find(rest) {
                start = self.push(line, keyword(m.as_str()), m.as_str(), lineno, start);
                continue;
            }
            if let Some(m) = NUMBER.find(rest) {
                start = self.push(line, TokenType::INT, m.as_str(), lineno, start);
                continue;
            }
            if let Some(m) = NAME.find(rest) {
                start = self.push(line, TokenType::IDENT, m.as_str(), lineno, start);
                continue;
            }
            if let Some((lexeme, typ)) = SIMPLE_TOKENS
                .iter()
                .find(|(lexeme, _)| rest.starts_with(lexeme))
            {
                start = self.push(line, *typ, lexeme, lineno, start);
                continue;
            }
            if rest.starts_with('"') {
                self.in_string = true;
                self.current_string.clear();
                self.string_start = Location {
                    line: lineno,
                    column: column(line, start),
                };
                start += 1;
                continue;
            }

            let mut buf = [0u8; 4];
            let illegal = match rest.chars().next() {
                Some(chr) => chr.encode_utf8(&mut buf),
                None => break,
            };
            start = self.push(line, TokenType::ILLEGAL, illegal, lineno, start);
        }

        if self.in_string {
            self.current_string.push('\n');
        }
        self.end_of_input = Location {
            line: lineno,
            column: column(line, line.len()),
        };
        self.line += 1;
    }

    /// Pushes a token starting at byte offset `start` of `line` and returns
    /// the offset after it.
    fn push(&mut self, line: &str, typ: TokenType, lexeme: &str, lineno: usize, start: usize) -> usize {
        let end = start + lexeme.len();
        let span = Span::new(lineno, column(line, start), lineno, column(line, end));
        self.tokens.push(Token::new(typ, lexeme, span));
        end
    }
}

// Columns count characters, not bytes.
fn column(line: &str, offset: usize) -> usize {
    line[..offset].chars().count()
}

pub fn tokenize_string(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new();
    tokenizer.tokenize(input.lines().map(str::to_string));
    tokenizer.finalize()
}

pub fn tokenize_file<P>(path: P) -> io::Result<Vec<Token>>
where
    P: AsRef<Path>,
{
    let lines = read_lines(path)?.collect::<io::Result<Vec<String>>>()?;
    let mut tokenizer = Tokenizer::new();
    tokenizer.tokenize(lines.into_iter());
    Ok(tokenizer.finalize())
}

fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}
