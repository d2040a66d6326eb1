//! Command flow tests
//!
//! Drives the interactive flows end to end against a `TestBackend`
//! terminal with scripted key events, recording what the flows ask of
//! their host (external opens, nested viewers).

use anyhow::{bail, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use serde_json::json;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use zipscope::archive::{ArchiveReader, EntryMeta};
use zipscope::commands::{browse_flow, conversations_flow, list_flow, tree_flow, AppContext};
use zipscope::config::Config;
use zipscope::error::ToolError;
use zipscope::transcript::{parse_conversations, parse_plain_transcript, Message};
use zipscope::ui::screens::ListOutcome;
use zipscope::ui::{Ended, EventReader, Host};

/// Event reader that replays a fixed script and fails once it runs dry,
/// so a flow that never exits fails the test instead of hanging.
struct ScriptedEvents {
    events: VecDeque<Event>,
}

impl EventReader for ScriptedEvents {
    fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None => bail!("event script exhausted"),
        }
    }
}

struct TestHost {
    terminal: Terminal<TestBackend>,
    events: ScriptedEvents,
    opened: Vec<PathBuf>,
    nested: Vec<Vec<OsString>>,
    nested_fails: bool,
    suspended: usize,
    resumed: usize,
}

impl TestHost {
    fn new(keys: &[KeyCode]) -> Self {
        Self {
            terminal: Terminal::new(TestBackend::new(80, 20)).unwrap(),
            events: ScriptedEvents {
                events: keys.iter().map(|&code| key_event(code)).collect(),
            },
            opened: Vec::new(),
            nested: Vec::new(),
            nested_fails: false,
            suspended: 0,
            resumed: 0,
        }
    }

    fn with_events(events: Vec<Event>) -> Self {
        let mut host = Self::new(&[]);
        host.events.events = events.into();
        host
    }

    /// Everything currently drawn, row by row.
    fn screen_text(&self) -> String {
        let buffer = self.terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Host for TestHost {
    type Backend = TestBackend;

    fn parts(&mut self) -> (&mut Terminal<TestBackend>, &mut dyn EventReader) {
        (&mut self.terminal, &mut self.events)
    }

    fn suspend(&mut self) -> Result<()> {
        self.suspended += 1;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.resumed += 1;
        Ok(())
    }

    fn open_external(&mut self, path: &Path) -> bool {
        self.opened.push(path.to_path_buf());
        true
    }

    fn run_nested(&mut self, args: Vec<OsString>) -> impl Future<Output = Result<(), ToolError>> {
        self.nested.push(args);
        let fails = self.nested_fails;
        async move {
            if fails {
                Err(ToolError::ChildProcess {
                    detail: "tree exit code 2".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }
}

/// In-memory archive standing in for a zip file.
#[derive(Clone)]
struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveReader for MemoryArchive {
    fn list_entry_names(&self) -> Result<Vec<String>, ToolError> {
        Ok(self.entries.iter().map(|(name, _)| name.clone()).collect())
    }

    fn read_entry_metadata(&self) -> Result<Vec<EntryMeta>, ToolError> {
        Ok(self
            .entries
            .iter()
            .map(|(name, data)| EntryMeta {
                name: name.clone(),
                compressed_size: data.len() as u64,
                uncompressed_size: data.len() as u64,
                method: "store".to_string(),
                crc32: "00000000".to_string(),
                is_directory: name.ends_with('/'),
                last_modified: None,
            })
            .collect())
    }

    fn read_entry_text(&self, name: &str) -> Result<String, ToolError> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
            .ok_or_else(|| ToolError::EntryNotFound {
                name: name.to_string(),
            })
    }

    fn extract_entry(&self, name: &str, dest: &Path) -> Result<(), ToolError> {
        let data = self
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| ToolError::EntryNotFound {
                name: name.to_string(),
            })?;
        fs::write(dest, data).map_err(|e| ToolError::io("write entry", e))
    }
}

fn key_event(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

fn ctrl_c() -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
}

fn chars(text: &str) -> Vec<KeyCode> {
    text.chars().map(KeyCode::Char).collect()
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn context_with_exports(dir: &Path) -> AppContext {
    let config = Config {
        export_dir: dir.to_path_buf(),
        ..Config::default()
    };
    AppContext::new(config, None)
}

fn sample_archive() -> MemoryArchive {
    MemoryArchive {
        entries: vec![
            ("data.json".to_string(), br#"{"a": 1}"#.to_vec()),
            ("notes.txt".to_string(), b"plain".to_vec()),
            ("conversations.json".to_string(), b"[]".to_vec()),
        ],
    }
}

#[test]
fn test_list_flow_search_then_choose() {
    let mut keys = chars("/an");
    keys.push(KeyCode::Enter); // accept the search
    keys.push(KeyCode::Enter); // choose
    let mut host = TestHost::new(&keys);

    let ended = list_flow(
        &mut host,
        &AppContext::default(),
        "fruit",
        labels(&["apple", "Banana", "cherry"]),
    )
    .unwrap();

    assert_eq!(ended, Ended::Outcome(ListOutcome::Chosen(1)));
}

#[test]
fn test_list_flow_quit_and_interrupt() {
    let mut host = TestHost::new(&[KeyCode::Down, KeyCode::Char('q')]);
    let ended = list_flow(&mut host, &AppContext::default(), "t", labels(&["a", "b"])).unwrap();
    assert_eq!(ended, Ended::Outcome(ListOutcome::Cancelled));

    let mut host = TestHost::with_events(vec![key_event(KeyCode::Down), ctrl_c()]);
    let ended = list_flow(&mut host, &AppContext::default(), "t", labels(&["a", "b"])).unwrap();
    assert_eq!(ended, Ended::Interrupted);
}

#[test]
fn test_list_flow_draws_title_and_rows() {
    let mut host = TestHost::new(&[KeyCode::Char('q')]);
    list_flow(
        &mut host,
        &AppContext::default(),
        "archive.zip",
        labels(&["docs/readme.md", "src/main.rs"]),
    )
    .unwrap();

    let text = host.screen_text();
    assert!(text.contains("archive.zip (2)"));
    assert!(text.contains("docs/readme.md"));
    assert!(text.contains("src/main.rs"));
    assert!(text.contains("q=quit"));
}

#[test]
fn test_exhausted_script_is_an_error() {
    let mut host = TestHost::new(&[KeyCode::Down]);
    let result = list_flow(&mut host, &AppContext::default(), "t", labels(&["a"]));
    assert!(result.is_err());
}

#[test]
fn test_tree_flow_expands_nested_objects() {
    // Expand "a", then quit. The last frame shows its child.
    let mut host = TestHost::new(&[KeyCode::Enter, KeyCode::Char('q')]);
    let document = json!({"a": {"inner": 42}, "b": [1, 2]});

    let ended = tree_flow(&mut host, &AppContext::default(), "doc.json", document).unwrap();

    assert_eq!(ended, Ended::Outcome(()));
    let text = host.screen_text();
    assert!(text.contains("inner"));
    assert!(text.contains("42"));
}

#[test]
fn test_conversations_flow_exports_from_list_and_transcript() {
    let exports = TempDir::new().unwrap();
    let ctx = context_with_exports(exports.path());
    let raw = json!([{
        "title": "Rust lifetimes",
        "current_node": "b",
        "mapping": {
            "a": {"message": null, "parent": null, "children": ["b"]},
            "b": {
                "message": {"author": {"role": "user"}, "content": {"parts": ["hi"]}},
                "parent": "a",
                "children": []
            }
        }
    }]);
    let conversations = parse_conversations(&raw.to_string()).unwrap();

    // Export from the list, open, export again, back, quit.
    let keys = [
        KeyCode::Char('e'),
        KeyCode::Enter,
        KeyCode::Char('e'),
        KeyCode::Char('q'),
        KeyCode::Char('q'),
    ];
    let mut host = TestHost::new(&keys);
    let ended = conversations_flow(&mut host, &ctx, "export.zip", conversations).unwrap();
    assert_eq!(ended, Ended::Outcome(()));

    let mut files: Vec<PathBuf> = fs::read_dir(exports.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|p| p.ends_with("Rust lifetimes.txt")));
    assert!(files.iter().any(|p| p.ends_with("Rust lifetimes (1).txt")));

    for file in files {
        let text = fs::read_to_string(file).unwrap();
        assert_eq!(parse_plain_transcript(&text), vec![Message::new("user", "hi")]);
    }
}

#[test]
fn test_conversations_flow_interrupt_inside_transcript() {
    let raw = json!([{"title": "t", "mapping": {}}]);
    let conversations = parse_conversations(&raw.to_string()).unwrap();
    let mut host = TestHost::with_events(vec![key_event(KeyCode::Enter), ctrl_c()]);

    let ended =
        conversations_flow(&mut host, &AppContext::default(), "x.zip", conversations).unwrap();

    assert_eq!(ended, Ended::Interrupted);
}

#[tokio::test]
async fn test_browse_flow_preview_open_and_conversations() {
    let archive = sample_archive();
    let metas = archive.read_entry_metadata().unwrap();
    let keys = [
        KeyCode::Enter,     // data.json -> nested tree viewer
        KeyCode::Down,      // notes.txt
        KeyCode::Char('o'), // open externally
        KeyCode::Char('v'), // conversation viewer
        KeyCode::Char('q'),
    ];
    let mut host = TestHost::new(&keys);
    let ctx = AppContext::new(Config::default(), Some(PathBuf::from("cfg.json")));

    let ended = browse_flow(&mut host, &ctx, archive, Path::new("/data/export.zip"), metas)
        .await
        .unwrap();
    assert_eq!(ended, Ended::Outcome(()));

    assert_eq!(host.nested.len(), 2);
    let preview = &host.nested[0];
    assert_eq!(preview[0], OsString::from("--config"));
    assert_eq!(preview[2], OsString::from("tree"));
    let previewed = PathBuf::from(&preview[3]);
    assert!(previewed.ends_with("data.json"));
    // The scratch copy is removed once the viewer returns.
    assert!(!previewed.exists());

    assert_eq!(
        host.nested[1][2..],
        [OsString::from("gpt"), OsString::from("/data/export.zip")]
    );
    assert_eq!(host.suspended, 2);
    assert_eq!(host.resumed, 2);

    // Files handed to an external opener stay on disk.
    assert_eq!(host.opened.len(), 1);
    let opened = &host.opened[0];
    assert!(opened.ends_with("notes.txt"));
    assert_eq!(fs::read_to_string(opened).unwrap(), "plain");
    if let Some(dir) = opened.parent() {
        let _ = fs::remove_dir_all(dir);
    }

    assert!(host.screen_text().contains("Returned from GPT archive view"));
}

#[tokio::test]
async fn test_browse_flow_reports_nested_failure_as_status() {
    let archive = sample_archive();
    let metas = archive.read_entry_metadata().unwrap();
    let mut host = TestHost::new(&[KeyCode::Enter, KeyCode::Char('q')]);
    host.nested_fails = true;

    let ended = browse_flow(
        &mut host,
        &AppContext::default(),
        archive,
        Path::new("export.zip"),
        metas,
    )
    .await
    .unwrap();

    assert_eq!(ended, Ended::Outcome(()));
    assert!(host.screen_text().contains("Preview failed"));
}

#[tokio::test]
async fn test_browse_flow_without_conversations_stays_put() {
    let archive = MemoryArchive {
        entries: vec![("a.txt".to_string(), b"x".to_vec())],
    };
    let metas = archive.read_entry_metadata().unwrap();
    let mut host = TestHost::new(&[KeyCode::Char('v'), KeyCode::Char('q')]);

    browse_flow(
        &mut host,
        &AppContext::default(),
        archive,
        Path::new("plain.zip"),
        metas,
    )
    .await
    .unwrap();

    assert!(host.nested.is_empty());
    assert!(host.screen_text().contains("GPT view unavailable"));
}
