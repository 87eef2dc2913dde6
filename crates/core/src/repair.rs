use std::borrow::Cow;
use std::io;

use regex::Regex;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::fields::DeedFields;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepairError {
    /// The sanitized response is still not a JSON object.
    #[error("JSON decode error: {message}\nProblematic string:\n{input}")]
    Parse { message: String, input: String },
    #[error("Failed to serialize canonical JSON: {0}")]
    Serialize(String),
}

/// A model response recovered into JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Two-space indented, ASCII-only JSON, keys in the order the model
    /// wrote them.
    pub canonical: String,
    /// The parsed object, extra keys included.
    pub document: Map<String, Value>,
    /// Typed view over `document`.
    pub fields: DeedFields,
}

/// Normalize the framing of a model response without touching its content.
///
/// Trims whitespace, strips a leading ```` ```json ```` and trailing ```` ``` ````
/// fence on any line, drops non-printable characters other than `\n` and
/// `\r`, and makes sure the result starts with `{` and ends with `}`. Every
/// step is a no-op on canonical JSON.
pub fn sanitize_response(raw: &str) -> String {
    let trimmed = raw.trim();

    let fence_regex = Regex::new(r"(?m)^```json\s*|\s*```$").unwrap();
    let unfenced = fence_regex.replace_all(trimmed, "");

    let printable = strip_non_printable(&unfenced);

    let mut text = printable.trim().to_string();
    if !text.starts_with('{') {
        text.insert(0, '{');
    }
    if !text.ends_with('}') {
        text.push('}');
    }

    text
}

/// Sanitize and strictly parse a model response.
///
/// Never returns a partial mapping: either the whole object parses or the
/// error carries the parser message and the exact string that failed.
pub fn parse_response(raw: &str) -> Result<Extraction, RepairError> {
    let cleaned = sanitize_response(raw);

    let document: Map<String, Value> =
        serde_json::from_str(&cleaned).map_err(|e| RepairError::Parse {
            message: e.to_string(),
            input: cleaned.clone(),
        })?;

    let canonical = to_canonical_json(&document)?;
    let fields = DeedFields::from_map(&document);

    Ok(Extraction {
        canonical,
        document,
        fields,
    })
}

/// Two-space indentation with every non-ASCII character escaped as
/// `\uXXXX`.
pub fn to_canonical_json(document: &Map<String, Value>) -> Result<String, RepairError> {
    let mut out = Vec::new();
    let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"  "));
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);

    document
        .serialize(&mut serializer)
        .map_err(|e| RepairError::Serialize(e.to_string()))?;

    String::from_utf8(out).map_err(|e| RepairError::Serialize(e.to_string()))
}

/// Pretty printer whose string contents are pure ASCII. Characters outside
/// the BMP become surrogate pairs.
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;

        for (index, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;

            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + c.len_utf8();
        }

        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Drop everything that does not render as a visible glyph: the Unicode
/// "other" (control, format, surrogate, private-use, unassigned) and
/// separator categories. The ASCII space, `\n` and `\r` are kept.
fn strip_non_printable(text: &str) -> Cow<'_, str> {
    let non_printable = Regex::new(r"[[\p{C}\p{Z}]--[ \n\r]]").unwrap();
    non_printable.replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_response() {
        let raw = "```json\n{\"owner_name\": \"Jane Doe\"}\n```";
        let extraction = parse_response(raw).unwrap();

        assert_eq!(extraction.canonical, "{\n  \"owner_name\": \"Jane Doe\"\n}");
        assert_eq!(extraction.fields.get("owner_name"), Some("Jane Doe"));
        assert_eq!(extraction.document.len(), 1);
    }

    #[test]
    fn test_canonical_input_is_fixed_point() {
        let canonical = "{\n  \"owner_name\": \"Jane Doe\",\n  \"deed_type\": \"Quitclaim\"\n}";

        assert_eq!(sanitize_response(canonical), canonical);

        let once = parse_response(canonical).unwrap();
        let twice = parse_response(&once.canonical).unwrap();
        assert_eq!(once.canonical, canonical);
        assert_eq!(twice.canonical, once.canonical);
    }

    #[test]
    fn test_missing_leading_brace() {
        let extraction = parse_response(r#""owner_name": "Jane Doe"}"#).unwrap();
        assert_eq!(extraction.canonical, "{\n  \"owner_name\": \"Jane Doe\"\n}");
    }

    #[test]
    fn test_missing_trailing_brace() {
        let extraction = parse_response(r#"{"owner_name": "Jane Doe""#).unwrap();
        assert_eq!(extraction.fields.get("owner_name"), Some("Jane Doe"));
    }

    #[test]
    fn test_unterminated_string_is_rejected() {
        let err = parse_response(r#"{"owner_name": "Jane Doe"#).unwrap_err();

        match err {
            RepairError::Parse { message, input } => {
                assert!(!message.is_empty());
                assert_eq!(input, r#"{"owner_name": "Jane Doe}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncated_mid_object_is_rejected() {
        let raw = "```json\n{\n  \"owner_name\": \"Jane Doe\",\n  \"grantor_name\":";
        assert!(matches!(
            parse_response(raw),
            Err(RepairError::Parse { .. })
        ));
    }

    #[test]
    fn test_prose_response_is_rejected() {
        let raw = "I could not find a deed in this text.";
        let err = parse_response(raw).unwrap_err();
        assert!(err.to_string().contains("Problematic string:\n{I could not"));
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let raw = "{\"owner_name\":\u{0007} \"Jane\u{200B} Doe\",\t\"deed_type\": \"Grant\u{FEFF}\"}";
        let extraction = parse_response(raw).unwrap();

        assert_eq!(extraction.fields.get("owner_name"), Some("Jane Doe"));
        assert_eq!(extraction.fields.get("deed_type"), Some("Grant"));
    }

    #[test]
    fn test_newlines_and_unicode_are_kept() {
        let raw = "{\r\n\"owner_name\": \"José Núñez\",\n\"consideration\": \"$10.00 & other good (valuable) consideration\"\r\n}";
        let extraction = parse_response(raw).unwrap();

        assert_eq!(extraction.fields.get("owner_name"), Some("José Núñez"));
        assert!(extraction
            .canonical
            .contains(r#""owner_name": "Jos\u00e9 N\u00fa\u00f1ez""#));
        assert_eq!(
            extraction.fields.get("consideration"),
            Some("$10.00 & other good (valuable) consideration")
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let raw = r#"{"zeta": "1", "owner_name": "Jane", "alpha": "2"}"#;
        let extraction = parse_response(raw).unwrap();

        assert_eq!(
            extraction.canonical,
            "{\n  \"zeta\": \"1\",\n  \"owner_name\": \"Jane\",\n  \"alpha\": \"2\"\n}"
        );
    }

    #[test]
    fn test_extra_and_missing_keys_are_tolerated() {
        let raw = r#"{"owner_name": "Jane Doe", "zoning": "R-1"}"#;
        let extraction = parse_response(raw).unwrap();

        assert!(extraction.canonical.contains("\"zoning\": \"R-1\""));
        assert_eq!(extraction.fields.get("grantee_name"), None);
        assert_eq!(extraction.fields.extra.get("zoning"), Some(&Value::from("R-1")));
    }

    #[test]
    fn test_empty_response_is_empty_object() {
        let extraction = parse_response("   ").unwrap();
        assert!(extraction.document.is_empty());
        assert_eq!(extraction.canonical, "{}");
    }

    #[test]
    fn test_sanitize_fence_without_newline() {
        assert_eq!(
            sanitize_response("```json{\"a\": \"b\"}```"),
            "{\"a\": \"b\"}"
        );
    }

    #[test]
    fn test_non_printable_classification() {
        assert_eq!(strip_non_printable("a §漢 b"), "a §漢 b");
        assert_eq!(strip_non_printable("a\r\nb"), "a\r\nb");
        assert_eq!(strip_non_printable("a\tb"), "ab");
        assert_eq!(strip_non_printable("a\u{00A0}b\u{2028}c"), "abc");
        assert_eq!(strip_non_printable("a\u{200D}b\u{E000}c"), "abc");
    }

    #[test]
    fn test_canonical_json_escapes_non_ascii() {
        let extraction =
            parse_response("{\"grantor_name\": \"Zoë 🏠\", \"notes\": [\"ß\", {\"x\": \"\\\"q\\\"\"}]}")
                .unwrap();

        assert_eq!(
            extraction.canonical,
            "{\n  \"grantor_name\": \"Zo\\u00eb \\ud83c\\udfe0\",\n  \"notes\": [\n    \"\\u00df\",\n    {\n      \"x\": \"\\\"q\\\"\"\n    }\n  ]\n}"
        );
        assert!(extraction.canonical.is_ascii());

        let reparsed = parse_response(&extraction.canonical).unwrap();
        assert_eq!(reparsed.document, extraction.document);
        assert_eq!(reparsed.canonical, extraction.canonical);
    }

    #[test]
    fn test_unassigned_code_points_are_stripped() {
        let raw = "{\"owner_name\": \"Jane\u{0378} Doe\u{10FFFF}\"}";
        let extraction = parse_response(raw).unwrap();
        assert_eq!(extraction.fields.get("owner_name"), Some("Jane Doe"));
    }
}
