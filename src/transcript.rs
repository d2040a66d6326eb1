//! # Conversation Transcripts
//!
//! Reduces a conversation export's message mapping (a tree of nodes linked by
//! `parent` / `children`) to the single ordered thread ending at the current
//! leaf, and converts that thread to and from a plain-text transcript.
//!
//! ## Plain-text format
//!
//! ```text
//! [user]
//! hi
//!
//! [assistant]
//! hello there
//!
//! ```
//!
//! A line of the form `[author]` starts a new message when it is the first
//! line or follows a blank line. Body lines that look like a header, with any
//! number of leading backslashes, get one extra backslash on export, which
//! parsing removes again.

use crate::error::ToolError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Entry holding the conversation list inside an export archive.
pub const CONVERSATIONS_ENTRY: &str = "conversations.json";

/// Authors kept by [`reduce_to_messages`].
pub const DEFAULT_ROLES: [&str; 2] = ["user", "assistant"];

pub const MAX_FILENAME_LEN: usize = 120;

const FALLBACK_NAME: &str = "conversation";

static HEADER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\[([^\[\]]+)\]$").ok());
static WHITESPACE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());
static UNSAFE_CHARS_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: String,
    pub text: String,
}

impl Message {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// Loose truthiness used by the export format: absent, `null`, `false`, `0`
/// and `""` all count as missing.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn join_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .map(part_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn part_text(part: &Value) -> String {
    match part {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Object(obj) => match (obj.get("text"), obj.get("content"), obj.get("parts")) {
            (Some(Value::String(text)), _, _) => text.clone(),
            (_, Some(Value::String(content)), _) => content.clone(),
            (_, Some(Value::Array(items)), _) => join_parts(items),
            (_, _, Some(Value::Array(items))) => join_parts(items),
            _ => String::new(),
        },
        Value::Null | Value::Array(_) => String::new(),
    }
}

/// Human-readable text of a message's `content`.
pub fn extract_text(content: &Value) -> String {
    let text = match content {
        Value::Object(obj) => match (obj.get("parts"), obj.get("text")) {
            (Some(Value::Array(parts)), _) => join_parts(parts),
            (_, Some(Value::String(text))) => text.clone(),
            _ => String::new(),
        },
        Value::String(s) => s.clone(),
        _ => String::new(),
    };
    text.trim().to_string()
}

/// Author role of a message, then its name, then `unknown`.
pub fn extract_author(message: &Value) -> String {
    let author = message.get("author");
    ["role", "name"]
        .iter()
        .find_map(|field| {
            author
                .and_then(|a| a.get(field))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("unknown")
        .to_string()
}

/// Ids from the root down to `leaf`, following `parent` links. Stops at a
/// missing node or a cycle.
pub fn main_path_ids(mapping: &Map<String, Value>, leaf: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(leaf.to_string());
    while let Some(id) = current.take() {
        if id.is_empty() || !is_present(mapping.get(&id)) || !seen.insert(id.clone()) {
            break;
        }
        current = mapping
            .get(&id)
            .and_then(|node| node.get("parent"))
            .and_then(Value::as_str)
            .map(str::to_string);
        ids.push(id);
    }
    ids.reverse();
    ids
}

/// Pick the leaf to reduce towards when the export does not name one: the
/// childless node with a message and the latest `create_time`. Untimed leaves
/// only win when nothing was picked before them, so the first-seen leaf
/// decides among equals.
pub fn auto_detect_leaf(mapping: &Map<String, Value>) -> Option<String> {
    let mut best: Option<&str> = None;
    let mut best_time = f64::NEG_INFINITY;
    for (id, node) in mapping {
        let has_children = node
            .get("children")
            .and_then(Value::as_array)
            .is_some_and(|c| !c.is_empty());
        let message = node.get("message");
        if has_children || !is_present(message) {
            continue;
        }
        let time = message
            .and_then(|m| m.get("create_time"))
            .and_then(Value::as_f64);
        match time {
            Some(t) if t > best_time => {
                best_time = t;
                best = Some(id.as_str());
            }
            None if best.is_none() => best = Some(id.as_str()),
            _ => {}
        }
    }
    best.map(str::to_string)
}

/// Reduce a mapping to the ordered `user` / `assistant` thread.
pub fn reduce_to_messages(mapping: &Value, current_node_id: Option<&str>) -> Vec<Message> {
    reduce_with_roles(mapping, current_node_id, &DEFAULT_ROLES)
}

/// Like [`reduce_to_messages`] with an explicit author filter; an empty
/// filter keeps every author.
pub fn reduce_with_roles(
    mapping: &Value,
    current_node_id: Option<&str>,
    roles: &[&str],
) -> Vec<Message> {
    let Some(mapping) = mapping.as_object() else {
        return Vec::new();
    };
    let leaf = current_node_id
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| auto_detect_leaf(mapping));
    let Some(leaf) = leaf else {
        return Vec::new();
    };

    main_path_ids(mapping, &leaf)
        .iter()
        .filter_map(|id| {
            let message = mapping.get(id)?.get("message")?;
            if !is_present(Some(message)) {
                return None;
            }
            let author = extract_author(message);
            if !roles.is_empty() && !roles.contains(&author.as_str()) {
                return None;
            }
            let text = message.get("content").map(extract_text).unwrap_or_default();
            (!text.is_empty()).then(|| Message { author, text })
        })
        .collect()
}

/// One conversation of an export, with its list label.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub label: String,
    pub mapping: Value,
    pub current_node: Option<String>,
}

impl Conversation {
    pub fn from_value(index: usize, value: &Value) -> Self {
        let label = value
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map_or_else(|| format!("Conversation #{}", index + 1), str::to_string);
        Self {
            label,
            mapping: value
                .get("mapping")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
            current_node: value
                .get("current_node")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        reduce_to_messages(&self.mapping, self.current_node.as_deref())
    }
}

/// Parse the text of `conversations.json`, which must be a JSON array.
pub fn parse_conversations(text: &str) -> Result<Vec<Conversation>, ToolError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ToolError::JsonParse {
        detail: format!("{CONVERSATIONS_ENTRY}: {e}"),
    })?;
    match value {
        Value::Array(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| Conversation::from_value(i, item))
            .collect()),
        _ => Err(ToolError::ShapeMismatch {
            detail: format!("{CONVERSATIONS_ENTRY} did not contain an array"),
        }),
    }
}

/// Locate the mapping inside any of the accepted document shapes:
///
/// - a conversation list, `selector` being the index (default 0)
/// - one conversation object with `mapping` / `current_node`
/// - a bare mapping, `selector` being the leaf id
pub fn select_mapping(
    data: &Value,
    selector: Option<&str>,
) -> Result<(Value, Option<String>), ToolError> {
    match data {
        Value::Array(items) => {
            let index = match selector {
                Some(raw) => raw.trim().parse::<usize>().map_err(|_| ToolError::ShapeMismatch {
                    detail: format!("invalid conversation index: {raw}"),
                })?,
                None => 0,
            };
            match items.get(index) {
                Some(item @ Value::Object(_)) => {
                    let conversation = Conversation::from_value(index, item);
                    Ok((conversation.mapping, conversation.current_node))
                }
                _ => Err(ToolError::ShapeMismatch {
                    detail: format!("invalid conversation index: {index}"),
                }),
            }
        }
        Value::Object(obj) if obj.contains_key("mapping") => {
            let current = obj
                .get("current_node")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .or(selector)
                .map(str::to_string);
            Ok((obj.get("mapping").cloned().unwrap_or(Value::Null), current))
        }
        Value::Object(_) => Ok((data.clone(), selector.map(str::to_string))),
        _ => Err(ToolError::ShapeMismatch {
            detail: "unrecognized JSON shape".to_string(),
        }),
    }
}

pub fn build_plain_transcript(messages: &[Message]) -> String {
    let mut out = Vec::with_capacity(messages.len() * 3);
    for message in messages {
        let author = if message.author.is_empty() {
            "unknown"
        } else {
            message.author.as_str()
        };
        out.push(format!("[{author}]"));
        out.extend(message.text.split('\n').map(|line| {
            if is_header_like(line) {
                format!("\\{line}")
            } else {
                line.to_string()
            }
        }));
        out.push(String::new());
    }
    out.join("\n")
}

fn header_author(line: &str) -> Option<&str> {
    HEADER_RE
        .as_ref()?
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `[author]` behind zero or more backslashes.
fn is_header_like(line: &str) -> bool {
    header_author(line.trim_start_matches('\\')).is_some()
}

pub fn parse_plain_transcript(text: &str) -> Vec<Message> {
    fn finish(current: Option<(String, Vec<&str>)>, out: &mut Vec<Message>) {
        if let Some((author, mut body)) = current {
            if body.last().is_some_and(|l| l.is_empty()) {
                body.pop();
            }
            out.push(Message::new(author, body.join("\n")));
        }
    }

    let mut out = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut previous_blank = true;
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match header_author(line).filter(|_| previous_blank) {
            Some(author) => {
                finish(current.take(), &mut out);
                current = Some((author.to_string(), Vec::new()));
            }
            None => {
                if let Some((_, body)) = current.as_mut() {
                    let unescaped = line
                        .strip_prefix('\\')
                        .filter(|_| is_header_like(line))
                        .unwrap_or(line);
                    body.push(unescaped);
                }
            }
        }
        previous_blank = line.is_empty();
    }
    finish(current, &mut out);
    out
}

/// Turn a conversation title into a base filename that is safe on every
/// platform.
pub fn safe_filename(title: &str, max: usize) -> String {
    let title = title.trim();
    let collapsed = match WHITESPACE_RE.as_ref() {
        Some(re) => re.replace_all(title, " ").into_owned(),
        None => title.to_string(),
    };
    let cut: String = collapsed.chars().take(max).collect();
    let safe = match UNSAFE_CHARS_RE.as_ref() {
        Some(re) => re.replace_all(&cut, "_").into_owned(),
        None => cut,
    };
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        safe
    }
}

/// Write the transcript to `<dir>/<title>.txt`, or `<title> (n).txt` when
/// that name is taken. Returns the created path.
pub fn export_plain(dir: &Path, title: &str, messages: &[Message]) -> Result<PathBuf, ToolError> {
    fs::create_dir_all(dir)
        .map_err(|e| ToolError::io(format!("create {}", dir.display()), e))?;
    let base = safe_filename(title, MAX_FILENAME_LEN);
    let content = build_plain_transcript(messages);

    let mut attempt = 0usize;
    loop {
        let name = match attempt {
            0 => format!("{base}.txt"),
            n => format!("{base} ({n}).txt"),
        };
        let candidate = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(content.as_bytes())
                    .map_err(|e| ToolError::io(format!("write {}", candidate.display()), e))?;
                tracing::info!(path = %candidate.display(), messages = messages.len(), "exported transcript");
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(ToolError::io(format!("create {}", candidate.display()), e));
            }
        }
    }
}
