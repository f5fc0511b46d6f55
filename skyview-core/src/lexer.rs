/// Tokenizer for the OBJ-style mesh text format
///
/// Splits source text into keywords, numeric fields, comments and line breaks,
/// each tagged with its 1-based line number. Runs of blanks collapse into a
/// single delimiter and `\r` counts as a blank, so CRLF sources lex the same
/// as LF ones.
use nom::{
    branch::alt,
    bytes::complete::{take_till, take_till1, take_while},
    character::complete::char,
    combinator::map,
    sequence::preceded,
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// First word of a line (`v`, `vt`, `f`, `g`, ...)
    Keyword(&'a str),
    /// A field following the keyword, not yet converted
    Number(&'a str),
    /// Text after `#`, or the name on a group line
    Comment(&'a str),
    Newline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub line: usize,
}

pub struct Lexer<'a> {
    rest: &'a str,
    line: usize,
    line_start: bool,
    rest_is_comment: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            line: 1,
            line_start: true,
            rest_is_comment: false,
        }
    }

    fn advance(&mut self, token: Token<'a>) {
        match token {
            Token::Newline => {
                self.line += 1;
                self.line_start = true;
                self.rest_is_comment = false;
            }
            Token::Keyword(keyword) => {
                self.line_start = false;
                // group names are free text, not fields
                self.rest_is_comment = keyword == "g";
            }
            Token::Number(_) | Token::Comment(_) => {
                self.line_start = false;
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Spanned<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (rest, _) = blanks(self.rest).ok()?;
        self.rest = rest;
        if self.rest.is_empty() {
            return None;
        }

        let line = self.line;
        let result = if self.rest_is_comment && !self.rest.starts_with('\n') {
            self.rest_is_comment = false;
            map(rest_of_line, Token::Comment)(self.rest)
        } else if self.line_start {
            alt((newline, comment, map(word, Token::Keyword)))(self.rest)
        } else {
            alt((newline, comment, map(word, Token::Number)))(self.rest)
        };

        let (rest, token) = result.ok()?;
        self.rest = rest;
        self.advance(token);
        Some(Spanned { token, line })
    }
}

fn blanks(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != '\n' && c.is_whitespace())(input)
}

fn rest_of_line(input: &str) -> IResult<&str, &str> {
    map(take_till(|c: char| c == '\n'), str::trim_end)(input)
}

fn newline(input: &str) -> IResult<&str, Token<'_>> {
    map(char('\n'), |_| Token::Newline)(input)
}

fn comment(input: &str) -> IResult<&str, Token<'_>> {
    map(preceded(char('#'), rest_of_line), Token::Comment)(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || c == '#')(input)
}
