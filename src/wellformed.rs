//! XML well-formedness checking
//!
//! Syntax only: no schema, no DTD processing and no namespace validation.
//! Tokenizing is delegated to `quick-xml`; on top of its tokenizer this module
//! enforces the well-formedness rules the tokenizer lets through (reference
//! syntax, tag nesting, a single root element, declaration placement) and maps
//! every failure to a 1-based line and column in the decoded document.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::validator::{DocumentValidator, ValidationResult};

const PREDEFINED_ENTITIES: [&[u8]; 5] = [b"amp", b"lt", b"gt", b"quot", b"apos"];

const UNESCAPED_AMPERSAND: &str = "unescaped '&' (not a valid entity or character reference, use &amp;)";

/// Stateless well-formedness checker
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlChecker;

impl XmlChecker {
    pub fn new() -> Self {
        Self
    }

    /// Read and check one file. Read failures come back as an unpositioned `Invalid`.
    pub fn check_file(&self, path: &Path) -> ValidationResult {
        match fs::read(path) {
            Ok(bytes) => self.check_bytes(&bytes),
            Err(err) => ValidationResult::io_error(err.to_string()),
        }
    }

    /// Decode raw file contents and check them
    pub fn check_bytes(&self, bytes: &[u8]) -> ValidationResult {
        match decode(bytes) {
            Ok(content) => self.check_str(&content),
            Err(message) => ValidationResult::io_error(message),
        }
    }

    /// Check an already-decoded document
    pub fn check_str(&self, content: &str) -> ValidationResult {
        // Report whichever violation comes first in the document.
        let error = match (scan(content).err(), invalid_char(content)) {
            (Some(syntax), Some(character)) if character.offset < syntax.offset => Some(character),
            (syntax, character) => syntax.or(character),
        };

        match error {
            None => ValidationResult::Valid,
            Some(err) => {
                let (line, column) = line_col(content, err.offset);
                ValidationResult::parse_error(line, column, err.message)
            }
        }
    }
}

impl DocumentValidator for XmlChecker {
    fn validate(&self, path: &Path) -> ValidationResult {
        self.check_file(path)
    }
}

/// A well-formedness violation at a byte offset into the decoded document
#[derive(Debug)]
struct SyntaxError {
    offset: usize,
    message: String,
}

impl SyntaxError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Decode by byte order mark, else by the encoding named in the XML
/// declaration, else as UTF-8
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?, bytes),
    };

    if encoding == UTF_8 {
        return std::str::from_utf8(body)
            .map(Cow::Borrowed)
            .map_err(|e| format!("encoding error: invalid UTF-8: {e}"));
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| format!("encoding error: invalid {} input", encoding.name()))
}

fn declared_encoding(bytes: &[u8]) -> Result<&'static Encoding, String> {
    let Some(label) = encoding_label(bytes) else {
        return Ok(UTF_8);
    };
    Encoding::for_label(label).ok_or_else(|| {
        format!(
            "encoding error: unknown encoding '{}'",
            String::from_utf8_lossy(label)
        )
    })
}

/// The `encoding="..."` value of a leading `<?xml ...?>` declaration
fn encoding_label(bytes: &[u8]) -> Option<&[u8]> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    if !decl.first().is_some_and(|b| b.is_ascii_whitespace()) {
        return None;
    }
    let decl = &decl[..find(decl, b"?>")?];

    let name_end = find(decl, b"encoding")? + b"encoding".len();
    let value = decl[name_end..]
        .trim_ascii_start()
        .strip_prefix(b"=")?
        .trim_ascii_start();
    let (&quote, value) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = value.iter().position(|&b| b == quote)?;
    Some(&value[..end])
}

/// 1-based line and 1-based column (in characters) of a byte offset
fn line_col(content: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn scan(content: &str) -> Result<(), SyntaxError> {
    let mut reader = Reader::from_str(content);
    // Nesting is tracked below so mismatches get our own message and position.
    reader.config_mut().check_end_names = false;

    let mut open: Vec<(Vec<u8>, usize)> = Vec::new();
    let mut root_seen = false;
    let mut root_closed = false;
    let mut has_doctype = false;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| SyntaxError::new(start, e.to_string()))?;

        match event {
            Event::Decl(_) => {
                if start != 0 {
                    return Err(SyntaxError::new(
                        start,
                        "XML declaration allowed only at the start of the document",
                    ));
                }
            }
            Event::DocType(_) => {
                if root_seen {
                    return Err(junk_after_root(start));
                }
                if has_doctype {
                    return Err(SyntaxError::new(start, "duplicate DOCTYPE declaration"));
                }
                has_doctype = true;
            }
            Event::Start(tag) => {
                if root_closed {
                    return Err(junk_after_root(start));
                }
                check_tag(&tag, start, has_doctype)?;
                root_seen = true;
                open.push((tag.name().into_inner().to_vec(), start));
            }
            Event::Empty(tag) => {
                if root_closed {
                    return Err(junk_after_root(start));
                }
                check_tag(&tag, start, has_doctype)?;
                root_seen = true;
                if open.is_empty() {
                    root_closed = true;
                }
            }
            Event::End(tag) => {
                let name = tag.name().into_inner();
                match open.pop() {
                    Some((expected, _)) if expected.as_slice() == name => {
                        if open.is_empty() {
                            root_closed = true;
                        }
                    }
                    Some((expected, _)) => {
                        return Err(SyntaxError::new(
                            start,
                            format!(
                                "mismatched tag: expected </{}>, found </{}>",
                                String::from_utf8_lossy(&expected),
                                String::from_utf8_lossy(name)
                            ),
                        ));
                    }
                    None => {
                        return Err(SyntaxError::new(
                            start,
                            format!(
                                "closing tag </{}> has no matching start tag",
                                String::from_utf8_lossy(name)
                            ),
                        ));
                    }
                }
            }
            Event::Text(text) => {
                let raw: &[u8] = &text;
                if open.is_empty() {
                    if !raw.iter().all(u8::is_ascii_whitespace) {
                        return Err(if root_closed {
                            junk_after_root(start)
                        } else {
                            SyntaxError::new(start, "text is not allowed outside the root element")
                        });
                    }
                } else {
                    check_references(raw, start, has_doctype)?;
                    if let Some(i) = find(raw, b"]]>") {
                        return Err(SyntaxError::new(
                            start + i,
                            "']]>' is not allowed in character data",
                        ));
                    }
                }
            }
            Event::CData(_) => {
                if open.is_empty() {
                    return Err(if root_closed {
                        junk_after_root(start)
                    } else {
                        SyntaxError::new(start, "CDATA section outside the root element")
                    });
                }
            }
            Event::Comment(comment) => {
                let raw: &[u8] = &comment;
                // Content begins after "<!--".
                if let Some(i) = find(raw, b"--") {
                    return Err(SyntaxError::new(
                        start + 4 + i,
                        "'--' is not allowed inside a comment",
                    ));
                }
                if raw.ends_with(b"-") {
                    return Err(SyntaxError::new(
                        start + 4 + raw.len() - 1,
                        "comment must not end with '-'",
                    ));
                }
            }
            Event::PI(pi) => {
                let raw: &[u8] = &pi;
                let target_len = raw
                    .iter()
                    .position(u8::is_ascii_whitespace)
                    .unwrap_or(raw.len());
                let target = &raw[..target_len];
                // Target begins after "<?".
                if !is_name(target) {
                    return Err(SyntaxError::new(
                        start + 2,
                        "invalid processing instruction target",
                    ));
                }
                if target.eq_ignore_ascii_case(b"xml") {
                    return Err(SyntaxError::new(
                        start + 2,
                        format!(
                            "reserved processing instruction target '{}'",
                            String::from_utf8_lossy(target)
                        ),
                    ));
                }
            }
            Event::Eof => break,
        }
    }

    if let Some((name, opened_at)) = open.last() {
        let (line, column) = line_col(content, *opened_at);
        return Err(SyntaxError::new(
            content.len(),
            format!(
                "no closing tag for element <{}> opened at line {line}, column {column}",
                String::from_utf8_lossy(name)
            ),
        ));
    }
    if !root_seen {
        return Err(SyntaxError::new(content.len(), "no element found"));
    }
    Ok(())
}

fn junk_after_root(offset: usize) -> SyntaxError {
    SyntaxError::new(offset, "junk after document element")
}

/// Check the inside of a start or empty-element tag; `start` is the offset of its '<'
fn check_tag(tag: &BytesStart<'_>, start: usize, has_doctype: bool) -> Result<(), SyntaxError> {
    let raw: &[u8] = tag;
    let raw_start = start + 1;

    if !is_name(tag.name().into_inner()) {
        return Err(SyntaxError::new(raw_start, "not well-formed (invalid element name)"));
    }
    if let Some(i) = raw.iter().position(|&b| b == b'<') {
        return Err(SyntaxError::new(
            raw_start + i,
            "'<' is not allowed inside a tag or attribute value",
        ));
    }
    if let Some(i) = unseparated_attribute(raw) {
        return Err(SyntaxError::new(
            raw_start + i,
            "attributes must be separated by whitespace",
        ));
    }
    check_references(raw, raw_start, has_doctype)?;

    for attribute in tag.attributes() {
        if let Err(err) = attribute {
            return Err(SyntaxError::new(start, format!("malformed attribute: {err}")));
        }
    }
    Ok(())
}

/// Index of the first byte that directly follows a quoted attribute value
/// without intervening whitespace
fn unseparated_attribute(raw: &[u8]) -> Option<usize> {
    let mut quote = None;
    let mut after_value = false;

    for (i, &b) in raw.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                    after_value = true;
                }
            }
            None => {
                if after_value && !b.is_ascii_whitespace() && b != b'/' {
                    return Some(i);
                }
                after_value = false;
                if b == b'"' || b == b'\'' {
                    quote = Some(b);
                }
            }
        }
    }
    None
}

/// First character outside the XML `Char` production, anywhere in the document
fn invalid_char(content: &str) -> Option<SyntaxError> {
    content
        .char_indices()
        .find(|&(_, c)| !is_xml_char(c as u32))
        .map(|(offset, c)| {
            SyntaxError::new(
                offset,
                format!("not well-formed (invalid character U+{:04X})", c as u32),
            )
        })
}

/// Every '&' in `raw` must open a complete entity or character reference.
/// `base` is the document offset of `raw[0]`.
fn check_references(raw: &[u8], base: usize, has_doctype: bool) -> Result<(), SyntaxError> {
    let mut pos = 0;
    while let Some(found) = raw[pos..].iter().position(|&b| b == b'&') {
        let amp = pos + found;
        let len = reference_len(&raw[amp + 1..], has_doctype)
            .map_err(|message| SyntaxError::new(base + amp, message))?;
        pos = amp + 1 + len;
    }
    Ok(())
}

/// Length of a reference body up to and including ';'.
///
/// Named references other than the predefined five are accepted only when the
/// document has a DOCTYPE, since its internal subset may declare them.
fn reference_len(rest: &[u8], has_doctype: bool) -> Result<usize, String> {
    let Some(end) = rest.iter().position(|&b| b == b';') else {
        return Err(UNESCAPED_AMPERSAND.to_string());
    };
    let body = &rest[..end];

    if let Some(number) = body.strip_prefix(b"#") {
        let code = match number.strip_prefix(b"x") {
            Some(hex) => parse_code_point(hex, 16),
            None => parse_code_point(number, 10),
        };
        return match code {
            Some(c) if is_xml_char(c) => Ok(end + 1),
            Some(c) => Err(format!("reference to invalid character number {c}")),
            None => Err(UNESCAPED_AMPERSAND.to_string()),
        };
    }

    if !is_name(body) {
        return Err(UNESCAPED_AMPERSAND.to_string());
    }
    if has_doctype || PREDEFINED_ENTITIES.contains(&body) {
        Ok(end + 1)
    } else {
        Err(format!(
            "undefined entity '&{};'",
            String::from_utf8_lossy(body)
        ))
    }
}

fn parse_code_point(digits: &[u8], radix: u32) -> Option<u32> {
    if digits.is_empty() || !digits.iter().all(|&b| (b as char).is_digit(radix)) {
        return None;
    }
    let digits = std::str::from_utf8(digits).ok()?;
    u32::from_str_radix(digits, radix).ok()
}

fn is_xml_char(c: u32) -> bool {
    matches!(c, 0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF)
}

fn is_name(name: &[u8]) -> bool {
    let Some((&first, rest)) = name.split_first() else {
        return false;
    };
    let name_start = |b: u8| b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80;
    name_start(first)
        && rest
            .iter()
            .all(|&b| name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.')
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
