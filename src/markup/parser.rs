//! Markup reader producing document-model nodes
//!
//! Elements land directly in the leaf/container union: CDATA sections and
//! non-whitespace text become a leaf's payload, child elements become a
//! container's children, and an element carrying both is rejected (the theme
//! format never produces mixed content). Comments, processing instructions,
//! and document type declarations are skipped.

use super::Document;
use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::node::{Attributes, Children, Node, Scalar};

/// Markup parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new parser over raw markup bytes
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse a complete document
    pub fn parse(&mut self) -> Result<Document> {
        self.skip_misc()?;
        let (name, node) = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::InvalidToken, "content after document root"));
        }

        Ok(Document { name, node })
    }

    /// Skip whitespace, comments, processing instructions, and declarations
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<!") && !self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(2);
                self.skip_until(b">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<(String, Node)> {
        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here(ErrorKind::InvalidToken, "unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.current() == Some(b'/') {
            self.cursor.advance();
            self.expect_byte(b'>')?;
            return Ok((name, Node::container(attributes, Children::new())));
        }

        self.expect_byte(b'>')?;

        let mut children = Children::new();
        let mut payload = String::new();
        let mut has_cdata = false;

        loop {
            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(Error::with_message(
                        ErrorKind::MismatchedTag {
                            expected: name.clone(),
                            found: close_name.clone(),
                        },
                        Span::new(self.cursor.position(), self.cursor.position()),
                        format!("expected </{name}>, found </{close_name}>"),
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                payload.push_str(&self.take_until(b"]]>")?);
                has_cdata = true;
                continue;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.starts_with(b"<!") {
                self.cursor.advance_by(2);
                self.skip_until(b">")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let (child_name, child) = self.parse_element()?;
                children.append(child_name, child);
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated element"));
            }

            if let Some(text) = self.parse_text()? {
                payload.push_str(&text);
            }
        }

        let has_content = has_cdata || !payload.is_empty();
        if has_content && !children.is_empty() {
            return Err(self.error_here(
                ErrorKind::MixedContent {
                    element: name.clone(),
                },
                format!("element {name} mixes text and child elements"),
            ));
        }

        if has_content {
            Ok((name, Node::leaf(attributes, payload)))
        } else {
            Ok((name, Node::container(attributes, children)))
        }
    }

    fn parse_attributes(&mut self) -> Result<Attributes> {
        let mut attributes = Attributes::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(
                        self.error_here(ErrorKind::UnterminatedMarkup, "unexpected end of input")
                    )
                }
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attributes.contains(&name) {
                return Err(self.error_here(
                    ErrorKind::DuplicateAttribute { name: name.clone() },
                    format!("duplicate attribute: {name}"),
                ));
            }
            attributes.insert(name, scalar_from_text(value));
        }

        Ok(attributes)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => {
                return Err(
                    self.error_here(ErrorKind::InvalidToken, "expected quoted attribute value")
                )
            }
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = self.bytes_to_string(raw)?;
                return self.decode_entities(&text);
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated attribute value"))
    }

    /// Parse a plain text run; whitespace-only runs are insignificant
    fn parse_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = self.bytes_to_string(raw)?;
        let text = self.decode_entities(&text)?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_owned()))
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(self.error_here(ErrorKind::InvalidToken, "expected name"));
        };
        if !is_name_start(first) {
            return Err(self.error_here(ErrorKind::InvalidToken, "expected name"));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        self.bytes_to_string(self.cursor.slice_from(start))
    }

    /// Consume input until the pattern, returning the verbatim text before it
    fn take_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return self.bytes_to_string(raw);
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated markup"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.current() == Some(expected) {
            self.cursor.advance();
            Ok(())
        } else {
            Err(self.error_here(ErrorKind::InvalidToken, "unexpected token"))
        }
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| self.error_here(ErrorKind::InvalidUtf8, "invalid utf-8"))
    }

    fn decode_entities(&self, input: &str) -> Result<String> {
        let mut result = String::new();
        let mut chars = input.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '&' {
                result.push(ch);
                continue;
            }

            let mut entity = String::new();
            for next in chars.by_ref() {
                if next == ';' {
                    break;
                }
                entity.push(next);
            }

            let decoded = match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            };

            match decoded {
                Some(ch) => result.push(ch),
                None => {
                    return Err(self.error_here(ErrorKind::InvalidEntity, "invalid entity"));
                }
            }
        }

        Ok(result)
    }

    fn error_here(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        let pos = self.cursor.position();
        Error::with_message(kind, Span::new(pos, pos), message.into())
    }
}

/// Type an attribute value: booleans and plain numeric literals become typed
/// scalars, everything else stays a string
fn scalar_from_text(raw: String) -> Scalar {
    match raw.as_str() {
        "true" => return Scalar::Bool(true),
        "false" => return Scalar::Bool(false),
        _ => {}
    }
    if looks_numeric(&raw) {
        if let Ok(number) = raw.parse::<f64>() {
            return Scalar::Number(number);
        }
    }
    Scalar::String(raw)
}

fn looks_numeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
