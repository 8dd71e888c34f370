//! Path expression tokenizer.
//!
//! Accepts dotted paths with optional bracket groups:
//! `Person.Contact.Email`, `Hobbies[0].People[1].Name`, `map['a.b']`.

use thiserror::Error;

use crate::types::{IntoPath, Path, Segment};
use crate::util::is_index_str;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated bracket starting at {0}")]
    UnterminatedBracket(usize),
    #[error("unterminated quote starting at {0}")]
    UnterminatedQuote(usize),
    #[error("unexpected character {1:?} at {0}")]
    UnexpectedChar(usize, char),
}

/// Convert a path expression into its canonical segment list.
///
/// - segment lists are returned as-is
/// - an empty string yields an empty path
/// - a plain key (no `.`, no bracket group) yields a single segment
/// - anything else goes through [`string_to_path`]; if that fails the whole
///   input is kept as one literal key
///
/// # Example
///
/// ```
/// use json_binding_path::{cast_path, path};
///
/// assert_eq!(cast_path("Person.Contact.Email"), path!["Person", "Contact", "Email"]);
/// assert_eq!(cast_path("Hobbies[0].Name"), path!["Hobbies", 0, "Name"]);
/// assert_eq!(cast_path(path!["Hobbies", 0]), path!["Hobbies", 0]);
/// assert_eq!(cast_path(""), path![]);
/// ```
pub fn cast_path<P: IntoPath>(expr: P) -> Path {
    expr.into_path()
}

pub(crate) fn cast_str(expr: &str) -> Path {
    if expr.is_empty() {
        return Vec::new();
    }
    if is_key(expr) {
        return vec![Segment::Key(expr.to_string())];
    }
    match string_to_path(expr) {
        Ok(path) => path,
        Err(err) => {
            tracing::trace!(expr, %err, "path kept as a literal key");
            vec![Segment::Key(expr.to_string())]
        }
    }
}

/// Check if `expr` is a property name rather than a path.
pub fn is_key(expr: &str) -> bool {
    if expr.contains('.') {
        return false;
    }
    match expr.find('[') {
        Some(open) => !expr[open..].contains(']'),
        None => true,
    }
}

/// Tokenize a dotted/bracketed path string.
pub fn string_to_path(expr: &str) -> Result<Path, ParseError> {
    PathParser::new(expr).parse()
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
    segments: Path,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            segments: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Path, ParseError> {
        if self.peek() == Some('.') {
            self.segments.push(Segment::Key(String::new()));
        }
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    // `a..b` and `a.` carry empty keys
                    if matches!(self.peek(), None | Some('.')) {
                        self.segments.push(Segment::Key(String::new()));
                    }
                }
                '[' => {
                    let segment = self.parse_bracket()?;
                    self.segments.push(segment);
                }
                ']' => return Err(ParseError::UnexpectedChar(self.pos, c)),
                _ => {
                    let name = self.parse_name();
                    self.segments.push(Segment::Key(name));
                }
            }
        }
        Ok(self.segments)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '.' | '[' | ']') {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_bracket(&mut self) -> Result<Segment, ParseError> {
        let open = self.pos;
        self.advance();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.advance();
                let key = self.parse_quoted(quote)?;
                if self.peek() != Some(']') {
                    return match self.peek() {
                        Some(c) => Err(ParseError::UnexpectedChar(self.pos, c)),
                        None => Err(ParseError::UnterminatedBracket(open)),
                    };
                }
                self.advance();
                Ok(Segment::Key(key))
            }
            _ => {
                let start = self.pos;
                loop {
                    match self.peek() {
                        Some(']') => break,
                        Some('[') => return Err(ParseError::UnexpectedChar(self.pos, '[')),
                        Some(_) => self.advance(),
                        None => return Err(ParseError::UnterminatedBracket(open)),
                    }
                }
                let content = &self.input[start..self.pos];
                self.advance();
                if is_index_str(content) {
                    if let Ok(idx) = content.parse::<usize>() {
                        return Ok(Segment::Index(idx));
                    }
                }
                Ok(Segment::Key(content.to_string()))
            }
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.pos.saturating_sub(1);
        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c) => {
                            out.push(c);
                            self.advance();
                        }
                        None => return Err(ParseError::UnterminatedQuote(start)),
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
                None => return Err(ParseError::UnterminatedQuote(start)),
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn test_plain_key() {
        assert_eq!(cast_path("FirstName"), path!["FirstName"]);
        assert_eq!(cast_path("0"), path!["0"]);
        assert_eq!(cast_path("a]b"), path!["a]b"]);
    }

    #[test]
    fn test_dotted() {
        assert_eq!(
            cast_path("Person.Contact.Email"),
            path!["Person", "Contact", "Email"]
        );
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            cast_path("Hobbies[0].People[1].Person.FirstName"),
            path!["Hobbies", 0, "People", 1, "Person", "FirstName"]
        );
        assert_eq!(cast_path("[3]"), path![3]);
        assert_eq!(cast_path("a[0][1]"), path!["a", 0, 1]);
        assert_eq!(cast_path("a[-1]"), path!["a", "-1"]);
        assert_eq!(cast_path("a[1.5]"), path!["a", "1.5"]);
        assert_eq!(cast_path("a[01]"), path!["a", "01"]);
        assert_eq!(cast_path("a[abc]"), path!["a", "abc"]);
    }

    #[test]
    fn test_quoted_brackets() {
        assert_eq!(cast_path("map['a.b'].c"), path!["map", "a.b", "c"]);
        assert_eq!(cast_path(r#"map["x"]"#), path!["map", "x"]);
        assert_eq!(cast_path(r"map['it\'s']"), path!["map", "it's"]);
        assert_eq!(cast_path(r"map['back\\slash']"), path!["map", r"back\slash"]);
        assert_eq!(cast_path("map['0']"), path!["map", "0"]);
    }

    #[test]
    fn test_empty_segments() {
        assert_eq!(cast_path(".a"), path!["", "a"]);
        assert_eq!(cast_path("a..b"), path!["a", "", "b"]);
        assert_eq!(cast_path("a."), path!["a", ""]);
        assert_eq!(cast_path("..a"), path!["", "", "a"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(cast_path(""), path![]);
        assert_eq!(cast_path(None::<&str>), path![]);
        assert_eq!(cast_path(()), path![]);
    }

    #[test]
    fn test_malformed_is_literal() {
        assert_eq!(cast_path("a.b[0"), path!["a.b[0"]);
        assert_eq!(cast_path("a['x].b"), path!["a['x].b"]);
        assert_eq!(cast_path("a.b]c"), path!["a.b]c"]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            string_to_path("a[0"),
            Err(ParseError::UnterminatedBracket(1))
        );
        assert_eq!(
            string_to_path("a['x"),
            Err(ParseError::UnterminatedQuote(2))
        );
        assert_eq!(
            string_to_path("a.b]"),
            Err(ParseError::UnexpectedChar(3, ']'))
        );
    }

    #[test]
    fn test_is_key() {
        assert!(is_key("abc"));
        assert!(is_key("a[b"));
        assert!(!is_key("a.b"));
        assert!(!is_key("a[0]"));
    }
}
