mod cursor;
mod lexer_error;
mod token;

use crate::ast::SourceLoc;
use cursor::Cursor;
use std::sync::Arc;

pub use lexer_error::{InnerLexError, LexError};
pub use token::{LocatedToken, Token};

pub type Tokens = Vec<LocatedToken>;

/// Consumes a keyword or identifier; the token table decides which.
fn lex_name(cursor: &mut Cursor) -> Token {
    let mut name = String::new();
    while let Some(c) = cursor.peek() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            break;
        }
        name.push(c);
        cursor.take();
    }
    Token::from(name.as_str())
}

fn lex_constant(cursor: &mut Cursor) -> Result<Token, InnerLexError> {
    let mut digits = String::new();
    while let Some(c) = cursor.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        cursor.take();
    }
    digits
        .parse::<i64>()
        .map(Token::IntLiteral)
        .map_err(|_| InnerLexError::IntegerOutOfRange(digits))
}

/// Consumes a `<`, `>` or `:` and widens it to `<=`, `>=` or `:=` when the
/// next character is `=`.
fn lex_mcharoperator(cursor: &mut Cursor) -> Token {
    let first = cursor.take().expect("Is always Some");
    let widened = cursor.skip_if(|c| c == '=');
    match (first, widened) {
        ('<', true) => Token::LessEq,
        ('<', false) => Token::Less,
        ('>', true) => Token::GreaterEq,
        ('>', false) => Token::Greater,
        (':', true) => Token::Assign,
        (':', false) => Token::Colon,
        _ => unreachable!(),
    }
}

/// Skips whitespace and `--` end-of-line comments between tokens.
fn skip_blanks(cursor: &mut Cursor) {
    loop {
        cursor.skip_whitespaces();
        let comment = cursor.peek() == Some('-') && cursor.peek_2nd() == Some('-');
        if !comment {
            break;
        }
        cursor.skip_line();
    }
}

pub fn lex(input: &str, filename: &str) -> Result<Tokens, LexError> {
    let file: Arc<str> = Arc::from(filename);
    let mut tokens = Tokens::new();
    let mut cursor = Cursor::new(input);
    skip_blanks(&mut cursor);

    while let Some(peek) = cursor.peek() {
        let loc = SourceLoc::new(Arc::clone(&file), cursor.line(), cursor.col());
        let token = match peek {
            ';' | ',' | '.' | '[' | ']' | '(' | ')' | '=' | '#' | '+' | '-' | '*' | '/' => {
                cursor.take();
                Ok(match peek {
                    ';' => Token::Semicolon,
                    ',' => Token::Comma,
                    '.' => Token::Dot,
                    '[' => Token::OpenBracket,
                    ']' => Token::CloseBracket,
                    '(' => Token::OpenParanth,
                    ')' => Token::CloseParanth,
                    '=' => Token::Equal,
                    '#' => Token::NotEqual,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Asterisk,
                    '/' => Token::FSlash,
                    _ => unreachable!(),
                })
            }
            '<' | '>' | ':' => Ok(lex_mcharoperator(&mut cursor)),
            'a'..='z' | 'A'..='Z' => Ok(lex_name(&mut cursor)),
            '0'..='9' => lex_constant(&mut cursor),
            _ => Err(InnerLexError::UnexpectedChar(peek)),
        }
        .map_err(|err| err.at(loc.clone()))?;
        tokens.push(LocatedToken::new(token, loc));
        skip_blanks(&mut cursor);
    }

    Ok(tokens)
}
