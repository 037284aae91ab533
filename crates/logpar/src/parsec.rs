//! A small backtracking parser-combinator core.
//!
//! A [`Parser<T>`] is a pure function from `(text, index)` to a
//! [`ParseResult<T>`]. The index is a byte offset into `text`; parsers never
//! mutate their input and report the offset reached on success, or the offset
//! of the failure otherwise. Parsers are cheap to clone (they share one
//! `Arc`'d closure) and are `Send + Sync`, so a composed parser can be reused
//! from many threads at once.
//!
//! An index past the end of the text, or one that does not fall on a UTF-8
//! boundary, is treated as end of input rather than a panic.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Value produced by a successful parse together with the next cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub value: T,
    pub index: usize,
}

impl<T> Success<T> {
    pub fn new(value: T, index: usize) -> Self {
        Self { value, index }
    }
}

/// A failed parse: what was expected, and where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {index}")]
pub struct Failure {
    pub message: String,
    pub index: usize,
}

impl Failure {
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

pub type ParseResult<T> = Result<Success<T>, Failure>;

type ParseFn<T> = dyn Fn(&str, usize) -> ParseResult<T> + Send + Sync;

/// A composable parser producing values of type `T`.
pub struct Parser<T> {
    run: Arc<ParseFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parser<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Parser<T> {
    /// Wraps a parsing function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, usize) -> ParseResult<T> + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// Runs the parser at `index`.
    pub fn parse(&self, text: &str, index: usize) -> ParseResult<T> {
        (self.run)(text, index)
    }

    /// Runs the parser from the start of `text`.
    pub fn run(&self, text: &str) -> ParseResult<T> {
        self.parse(text, 0)
    }

    /// Transforms the parsed value, keeping the cursor and any failure.
    pub fn map<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Parser::new(move |text, index| {
            self.parse(text, index)
                .map(|s| Success::new(f(s.value), s.index))
        })
    }

    /// Replaces the parsed value with a fixed one.
    pub fn replace<U>(self, value: U) -> Parser<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    /// Sequence: runs `self`, then `other` from where `self` stopped.
    pub fn then<U: 'static>(self, other: Parser<U>) -> Parser<(T, U)> {
        Parser::new(move |text, index| {
            let first = self.parse(text, index)?;
            let second = other.parse(text, first.index)?;
            Ok(Success::new((first.value, second.value), second.index))
        })
    }

    /// Sequence keeping only the right-hand value.
    pub fn ignore_then<U: 'static>(self, other: Parser<U>) -> Parser<U> {
        self.then(other).map(|(_, right)| right)
    }

    /// Sequence keeping only the left-hand value.
    pub fn then_ignore<U: 'static>(self, other: Parser<U>) -> Parser<T> {
        self.then(other).map(|(left, _)| left)
    }

    /// Ordered alternative. `other` is retried from the original index when
    /// `self` fails, however far `self` got. If both fail, the failure that
    /// reached further into the input is reported.
    pub fn or(self, other: Parser<T>) -> Parser<T> {
        Parser::new(move |text, index| match self.parse(text, index) {
            Ok(success) => Ok(success),
            Err(left) => other
                .parse(text, index)
                .map_err(|right| if left.index > right.index { left } else { right }),
        })
    }

    /// Monadic bind: the parser to run next is chosen from the parsed value.
    pub fn and_then<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> Parser<U> + Send + Sync + 'static,
    {
        Parser::new(move |text, index| {
            let first = self.parse(text, index)?;
            f(first.value).parse(text, first.index)
        })
    }
}

/// Never fails: yields `None` and leaves the cursor untouched when `p` fails.
pub fn opt<T: 'static>(p: Parser<T>) -> Parser<Option<T>> {
    Parser::new(move |text, index| match p.parse(text, index) {
        Ok(s) => Ok(Success::new(Some(s.value), s.index)),
        Err(_) => Ok(Success::new(None, index)),
    })
}

/// Zero or more repetitions of `p`. Never fails.
///
/// `p` must consume input whenever it succeeds. A success that does not move
/// the cursor ends the repetition and its value is dropped, so a zero-width
/// parser yields an empty list instead of looping forever.
pub fn many<T: 'static>(p: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |text, index| {
        let mut values = Vec::new();
        let mut cursor = index;
        while let Ok(s) = p.parse(text, cursor) {
            if s.index == cursor {
                break;
            }
            values.push(s.value);
            cursor = s.index;
        }
        Ok(Success::new(values, cursor))
    })
}

/// One or more repetitions of `p`; fails with `p`'s failure if there are none.
pub fn many1<T: 'static>(p: Parser<T>) -> Parser<Vec<T>> {
    let rest = many(p.clone());
    Parser::new(move |text, index| {
        let first = p.parse(text, index)?;
        let tail = rest.parse(text, first.index)?;
        let mut values = Vec::with_capacity(tail.value.len() + 1);
        values.push(first.value);
        values.extend(tail.value);
        Ok(Success::new(values, tail.index))
    })
}

/// Succeeds only at the end of input.
pub fn eof() -> Parser<()> {
    Parser::new(|text, index| match peek(text, index) {
        None => Ok(Success::new((), index)),
        Some(c) => Err(Failure::new(format!("Expected EOF, found '{c}'"), index)),
    })
}

/// Matches exactly `token`.
pub fn tag(token: &str) -> Parser<String> {
    let token = token.to_string();
    Parser::new(move |text, index| match text.get(index..) {
        Some(rest) if rest.starts_with(token.as_str()) => {
            Ok(Success::new(token.clone(), index + token.len()))
        }
        Some(rest) if !rest.is_empty() => Err(Failure::new(
            format!("Expected '{token}', found '{}'", preview(rest, token.len())),
            index,
        )),
        _ => Err(Failure::new(format!("Expected '{token}', found EOF"), index)),
    })
}

/// One character that is a member of `chars`.
pub fn char_in(chars: &str) -> Parser<char> {
    let chars = chars.to_string();
    Parser::new(move |text, index| match peek(text, index) {
        Some(c) if chars.contains(c) => Ok(Success::new(c, index + c.len_utf8())),
        Some(c) => Err(Failure::new(
            format!("Expected one of '{chars}', found '{c}'"),
            index,
        )),
        None => Err(Failure::new(
            format!("Expected one of '{chars}', found EOF"),
            index,
        )),
    })
}

/// One character that is not a member of `chars`.
pub fn char_not_in(chars: &str) -> Parser<char> {
    let chars = chars.to_string();
    Parser::new(move |text, index| match peek(text, index) {
        Some(c) if !chars.contains(c) => Ok(Success::new(c, index + c.len_utf8())),
        Some(c) => Err(Failure::new(
            format!("Expected not one of '{chars}', found '{c}'"),
            index,
        )),
        None => Err(Failure::new(
            format!("Expected not one of '{chars}', found EOF"),
            index,
        )),
    })
}

/// One ASCII letter or digit, or any character of `extended`.
pub fn char_alnum(extended: &str) -> Parser<char> {
    let extended = extended.to_string();
    Parser::new(move |text, index| match peek(text, index) {
        Some(c) if c.is_ascii_alphanumeric() || extended.contains(c) => {
            Ok(Success::new(c, index + c.len_utf8()))
        }
        Some(c) => Err(Failure::new(
            format!("Expected alphanumeric, found '{c}'"),
            index,
        )),
        None => Err(Failure::new("Expected alphanumeric, found EOF", index)),
    })
}

/// `esc` followed by a character of `chars` or by `esc` itself.
pub fn escaped_char(chars: &str, esc: char) -> Parser<char> {
    let mut escapable = chars.to_string();
    escapable.push(esc);
    char_in(&esc.to_string()).ignore_then(char_in(&escapable))
}

fn raw_char(reserved: &str, esc: char) -> Parser<char> {
    let mut stop = reserved.to_string();
    stop.push(esc);
    char_not_in(&stop).or(escaped_char(reserved, esc))
}

/// Greedily collects unreserved or escaped characters. May be empty.
pub fn raw_literal(reserved: &str, esc: char) -> Parser<String> {
    many(raw_char(reserved, esc)).map(|chars| chars.into_iter().collect())
}

/// Like [`raw_literal`] but requires at least one character.
pub fn raw_literal1(reserved: &str, esc: char) -> Parser<String> {
    many1(raw_char(reserved, esc)).map(|chars| chars.into_iter().collect())
}

/// The character at `index`, if `index` is a valid position inside `text`.
pub fn peek(text: &str, index: usize) -> Option<char> {
    text.get(index..).and_then(|rest| rest.chars().next())
}

fn preview(rest: &str, len: usize) -> String {
    rest.chars().take(len.max(1)).collect()
}
