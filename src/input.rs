//! Command input resolution: where the archive path or JSON document comes
//! from (an argument, a file, or a piped stdin payload).

use crate::error::ToolError;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Key of the stdin payload that carries the archive path.
pub const ZIP_PATH_KEY: &str = "zip_path";

/// Usage hint for commands that read a JSON document.
pub const JSON_SOURCE_USAGE: &str = "argv <file.json> or JSON piped on stdin";

const STRING_ARRAY_HINT: &str = r#"stdin must be JSON array of strings, e.g. ["a.json","b.json"]"#;

/// Stdin, or nothing when it is an interactive terminal that would block.
fn piped_stdin() -> Option<std::io::Stdin> {
    let stdin = std::io::stdin();
    (!stdin.is_terminal()).then_some(stdin)
}

fn read_all(reader: &mut dyn Read, what: &str) -> Result<String, ToolError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| ToolError::ReadFailed {
            what: what.to_string(),
            detail: e.to_string(),
        })?;
    Ok(raw)
}

/// Resolve the archive path from the positional argument or, failing that,
/// from a `{"zip_path": "..."}` payload on stdin.
pub fn resolve_zip_path(arg: Option<PathBuf>, usage: &'static str) -> Result<PathBuf, ToolError> {
    let mut stdin = piped_stdin();
    resolve_zip_path_from(
        arg,
        stdin.as_mut().map(|s| s as &mut dyn Read),
        usage,
    )
}

/// Testable core of [`resolve_zip_path`]. `stdin` is `None` when nothing is
/// piped.
pub fn resolve_zip_path_from(
    arg: Option<PathBuf>,
    stdin: Option<&mut dyn Read>,
    usage: &'static str,
) -> Result<PathBuf, ToolError> {
    if let Some(path) = arg.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let Some(reader) = stdin else {
        return Err(ToolError::InputMissing { usage });
    };
    let raw = read_all(reader, "stdin")?;
    let raw = if raw.trim().is_empty() { "{}" } else { raw.as_str() };
    let payload: Value = serde_json::from_str(raw).map_err(|e| ToolError::InputInvalid {
        reason: format!("stdin is not JSON: {e}"),
    })?;
    payload
        .get(ZIP_PATH_KEY)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .ok_or(ToolError::InputMissing { usage })
}

/// Parse a JSON array of strings. Empty input is an empty list.
pub fn parse_string_array(raw: &str) -> Result<Vec<String>, ToolError> {
    let raw = if raw.trim().is_empty() { "[]" } else { raw };
    let invalid = || ToolError::InputInvalid {
        reason: STRING_ARRAY_HINT.to_string(),
    };
    match serde_json::from_str::<Value>(raw).map_err(|_| invalid())? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// Read the string list for `pick` from piped stdin.
pub fn read_string_array_from_stdin() -> Result<Vec<String>, ToolError> {
    match piped_stdin() {
        Some(mut stdin) => parse_string_array(&read_all(&mut stdin, "stdin")?),
        None => Err(ToolError::InputInvalid {
            reason: STRING_ARRAY_HINT.to_string(),
        }),
    }
}

/// Read a JSON document's text from `path`, or from stdin when the path is
/// absent or `-`.
pub fn read_json_source(path: Option<&Path>) -> Result<String, ToolError> {
    match path.filter(|p| *p != Path::new("-")) {
        Some(path) => std::fs::read_to_string(path).map_err(|e| ToolError::ReadFailed {
            what: path.display().to_string(),
            detail: e.to_string(),
        }),
        None => match piped_stdin() {
            Some(mut stdin) => read_all(&mut stdin, "stdin"),
            None => Err(ToolError::InputMissing {
                usage: JSON_SOURCE_USAGE,
            }),
        },
    }
}

pub fn parse_json(text: &str) -> Result<Value, ToolError> {
    serde_json::from_str(text).map_err(|e| ToolError::JsonParse {
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZIP_PATH_USAGE;
    use std::io::Cursor;

    fn resolve(arg: Option<&str>, stdin: Option<&str>) -> Result<PathBuf, ToolError> {
        let mut cursor = stdin.map(|s| Cursor::new(s.as_bytes().to_vec()));
        resolve_zip_path_from(
            arg.map(PathBuf::from),
            cursor.as_mut().map(|c| c as &mut dyn Read),
            ZIP_PATH_USAGE,
        )
    }

    #[test]
    fn test_argument_wins_over_stdin() {
        let path = resolve(Some("a.zip"), Some(r#"{"zip_path":"b.zip"}"#)).expect("path");
        assert_eq!(path, PathBuf::from("a.zip"));
    }

    #[test]
    fn test_stdin_payload() {
        let path = resolve(None, Some(r#"{"zip_path":"/data/export.zip"}"#)).expect("path");
        assert_eq!(path, PathBuf::from("/data/export.zip"));
    }

    #[test]
    fn test_missing_everywhere() {
        assert!(matches!(resolve(None, None), Err(ToolError::InputMissing { .. })));
        assert!(matches!(resolve(None, Some("")), Err(ToolError::InputMissing { .. })));
        assert!(matches!(
            resolve(None, Some(r#"{"zip_path":""}"#)),
            Err(ToolError::InputMissing { .. })
        ));
        assert!(matches!(
            resolve(None, Some(r#"{"zip_path":3}"#)),
            Err(ToolError::InputMissing { .. })
        ));
    }

    #[test]
    fn test_stdin_not_json() {
        let err = resolve(None, Some("not json")).expect_err("invalid");
        assert_eq!(err.kind(), "ERR_INPUT_INVALID");
    }

    #[test]
    fn test_parse_string_array() {
        assert_eq!(
            parse_string_array(r#"["a.json","b.json"]"#).expect("list"),
            vec!["a.json", "b.json"]
        );
        assert!(parse_string_array("").expect("empty").is_empty());
        assert!(parse_string_array(r#"["a", 1]"#).is_err());
        assert!(parse_string_array(r#"{"a": 1}"#).is_err());
        assert!(parse_string_array("[").is_err());
    }

    #[test]
    fn test_read_json_source_missing_file() {
        let err = read_json_source(Some(Path::new("/no/such/file.json"))).expect_err("missing");
        assert_eq!(err.kind(), "ERR_READ");
    }

    #[test]
    fn test_parse_json_error_kind() {
        assert_eq!(parse_json("{").expect_err("bad").kind(), "ERR_JSON_PARSE");
        assert_eq!(parse_json("[1]").expect("ok"), serde_json::json!([1]));
    }
}
