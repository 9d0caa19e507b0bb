//! Line parser for tree operation scripts.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! insert 5 3 2 1 6 10 9   # several keys at once
//! delete 5
//! contains 9
//! height
//! ```

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{multispace0, satisfy};
use nom::combinator::{eof, map, not, opt, rest, value};
use nom::error::ParseError;
use nom::multi::many1;
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};
use tracing::{instrument, trace};

/// A single script command with its raw (not yet typed) key arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(Vec<String>),
    Delete(Vec<String>),
    Contains(String),
    Find(String),
    Min,
    Max,
    Height,
    Empty,
    Len,
    Print,
    Tree,
    Validate,
    Clear,
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '#'
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: Parser<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

// Matches `kw` only as a whole word: `min` must not match `minimum`.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(kw), not(satisfy(is_word_char)))
}

fn keys(input: &str) -> IResult<&str, Vec<String>> {
    map(many1(ws(word)), |words| {
        words.into_iter().map(str::to_string).collect()
    })(input)
}

fn single_key(input: &str) -> IResult<&str, String> {
    map(ws(word), str::to_string)(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(tag("#"), rest)(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        map(preceded(keyword("insert"), keys), Command::Insert),
        map(preceded(keyword("delete"), keys), Command::Delete),
        map(preceded(keyword("contains"), single_key), Command::Contains),
        map(preceded(keyword("find"), single_key), Command::Find),
        value(Command::Min, keyword("min")),
        value(Command::Max, keyword("max")),
        value(Command::Height, keyword("height")),
        value(Command::Empty, keyword("empty")),
        value(Command::Len, keyword("len")),
        value(Command::Print, keyword("print")),
        value(Command::Tree, keyword("tree")),
        value(Command::Validate, keyword("validate")),
        value(Command::Clear, keyword("clear")),
    ))(input)
}

/// Parses one script line. Blank and comment-only lines yield `None`.
#[instrument(level = "trace")]
pub fn parse_line(input: &str) -> IResult<&str, Option<Command>> {
    let (input, cmd) = ws(opt(command))(input)?;
    let (input, _) = opt(comment)(input)?;
    let (input, _) = eof(input)?;
    trace!("parsed: {:?}", cmd);
    Ok((input, cmd))
}
