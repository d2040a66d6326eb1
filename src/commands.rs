//! # Commands
//!
//! One entry point per subcommand. Each loads its primary data first (a
//! failure there is fatal and reported on the structured error channel),
//! then enters the terminal and runs a flow. Flows are generic over
//! [`Host`] so they can be driven against a test backend.
//!
//! Failures after the terminal is up (extraction, child processes,
//! exports) only become status messages.

use crate::archive::{extract_to_scratch, ArchiveReader, EntryMeta, ScratchFile, ZipArchiveReader};
use crate::config::Config;
use crate::error::{ToolError, ZIP_PATH_USAGE};
use crate::input::{
    parse_json, read_json_source, read_string_array_from_stdin, resolve_zip_path,
};
use crate::nav::TreeNavigator;
use crate::transcript::{
    export_plain, parse_conversations, reduce_to_messages, select_mapping, Conversation,
    Message, CONVERSATIONS_ENTRY,
};
use crate::ui::render::Status;
use crate::ui::screens::{
    BrowseAction, BrowserScreen, ConversationAction, ConversationsScreen, JsonTreeScreen,
    ListOutcome, ListScreen, TranscriptAction, TranscriptScreen,
};
use crate::ui::terminal::EXIT_INTERRUPTED;
use crate::ui::{Ended, Host, TerminalHost, Theme};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub config: Config,
    /// `--config` as given, forwarded to nested viewers.
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn theme(&self) -> &'static Theme {
        self.config.theme()
    }

    /// Arguments that re-run this program as `subcommand operand` with the
    /// same configuration.
    pub fn viewer_args(&self, subcommand: &str, operand: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(path) = &self.config_path {
            args.push(OsString::from("--config"));
            args.push(path.clone().into_os_string());
        }
        args.push(OsString::from(subcommand));
        args.push(operand.as_os_str().to_os_string());
        args
    }
}

fn exit_code<T>(ended: &Ended<T>) -> ExitCode {
    match ended {
        Ended::Outcome(_) => ExitCode::SUCCESS,
        Ended::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
    }
}

/// Last path component for titles, or the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Run archive I/O on the blocking pool.
async fn blocking<T, F>(what: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ToolError> + Send + 'static,
{
    let value = tokio::task::spawn_blocking(f)
        .await
        .with_context(|| format!("{what} task failed"))??;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Non-interactive commands
// ---------------------------------------------------------------------------

/// `meta`: the metadata of every entry as one JSON array.
pub fn meta(zip: Option<PathBuf>, out: &mut dyn Write) -> Result<()> {
    let path = resolve_zip_path(zip, ZIP_PATH_USAGE)?;
    let metas = ZipArchiveReader::new(&path).read_entry_metadata()?;
    write_meta(&metas, out)
}

pub fn write_meta(metas: &[EntryMeta], out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(&mut *out, metas).context("Failed to serialize metadata")?;
    writeln!(out).context("Failed to write metadata")?;
    Ok(())
}

/// `reduce`: the main-path messages of a conversation as pretty JSON.
pub fn reduce(file: &Path, selector: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let text = read_json_source(Some(file))?;
    let messages = reduce_document(&text, selector)?;
    serde_json::to_writer_pretty(&mut *out, &messages).context("Failed to serialize messages")?;
    writeln!(out).context("Failed to write messages")?;
    Ok(())
}

/// Parse `text` as a conversation list, one conversation or a bare mapping
/// and reduce it to messages.
pub fn reduce_document(text: &str, selector: Option<&str>) -> Result<Vec<Message>, ToolError> {
    let data = parse_json(text)?;
    let (mapping, current) = select_mapping(&data, selector)?;
    Ok(reduce_to_messages(&mapping, current.as_deref()))
}

// ---------------------------------------------------------------------------
// Interactive commands
// ---------------------------------------------------------------------------

/// `list`: the entry names of an archive.
pub async fn list(ctx: &AppContext, zip: Option<PathBuf>) -> Result<ExitCode> {
    let path = resolve_zip_path(zip, ZIP_PATH_USAGE)?;
    let reader = ZipArchiveReader::new(&path);
    let names = blocking("list entries", move || reader.list_entry_names()).await?;

    let mut host = TerminalHost::enter()?;
    let ended = list_flow(&mut host, ctx, &display_name(&path), names)?;
    Ok(exit_code(&ended))
}

/// `pick`: a list from a JSON array on stdin. The chosen label is printed
/// to stdout after the terminal is restored.
pub async fn pick(ctx: &AppContext) -> Result<ExitCode> {
    let labels = read_string_array_from_stdin()?;

    let mut host = TerminalHost::enter()?;
    let ended = list_flow(&mut host, ctx, "pick", labels.clone())?;
    drop(host);

    if let Ended::Outcome(ListOutcome::Chosen(index)) = ended {
        if let Some(label) = labels.get(index) {
            println!("{label}");
        }
    }
    Ok(exit_code(&ended))
}

/// `tree`: a JSON document from a file or stdin.
pub async fn tree(ctx: &AppContext, file: Option<PathBuf>) -> Result<ExitCode> {
    let text = read_json_source(file.as_deref())?;
    let document = parse_json(&text)?;
    let title = file
        .as_deref()
        .filter(|p| *p != Path::new("-"))
        .map_or_else(|| "stdin".to_string(), display_name);

    let mut host = TerminalHost::enter()?;
    let ended = tree_flow(&mut host, ctx, &title, document)?;
    Ok(exit_code(&ended))
}

/// `browse`: entries plus metadata, with previews and external opening.
pub async fn browse(ctx: &AppContext, zip: Option<PathBuf>) -> Result<ExitCode> {
    let path = resolve_zip_path(zip, ZIP_PATH_USAGE)?;
    let reader = ZipArchiveReader::new(&path);
    let metas = {
        let reader = reader.clone();
        blocking("read metadata", move || reader.read_entry_metadata()).await?
    };

    let mut host = TerminalHost::enter()?;
    let ended = browse_flow(&mut host, ctx, reader, &path, metas).await?;
    Ok(exit_code(&ended))
}

/// `gpt`: the conversations of an export archive.
pub async fn gpt(ctx: &AppContext, zip: Option<PathBuf>) -> Result<ExitCode> {
    let path = resolve_zip_path(zip, ZIP_PATH_USAGE)?;
    let reader = ZipArchiveReader::new(&path);
    let conversations = blocking("read conversations", move || {
        parse_conversations(&reader.read_entry_text(CONVERSATIONS_ENTRY)?)
    })
    .await?;
    tracing::info!(
        archive = %path.display(),
        count = conversations.len(),
        "loaded conversations"
    );

    let mut host = TerminalHost::enter()?;
    let ended = conversations_flow(&mut host, ctx, &display_name(&path), conversations)?;
    Ok(exit_code(&ended))
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

pub fn list_flow<H: Host>(
    host: &mut H,
    ctx: &AppContext,
    title: &str,
    labels: Vec<String>,
) -> Result<Ended<ListOutcome>> {
    let mut screen = ListScreen::new(title, labels);
    host.run(&mut screen, ctx.theme())
}

pub fn tree_flow<H: Host>(
    host: &mut H,
    ctx: &AppContext,
    title: &str,
    document: serde_json::Value,
) -> Result<Ended<()>> {
    let tree = TreeNavigator::with_preview_budget(document, ctx.config.preview_budget());
    let mut screen = JsonTreeScreen::new(title, tree);
    host.run(&mut screen, ctx.theme())
}

pub async fn browse_flow<H, R>(
    host: &mut H,
    ctx: &AppContext,
    reader: R,
    archive: &Path,
    metas: Vec<EntryMeta>,
) -> Result<Ended<()>>
where
    H: Host,
    R: ArchiveReader + Clone + 'static,
{
    let has_conversations = metas.iter().any(|m| m.name == CONVERSATIONS_ENTRY);
    let mut screen = BrowserScreen::new(
        display_name(archive),
        metas,
        ctx.config.pane_fraction(),
        has_conversations,
    );

    loop {
        let action = match host.run(&mut screen, ctx.theme())? {
            Ended::Outcome(action) => action,
            Ended::Interrupted => return Ok(Ended::Interrupted),
        };
        let status = match action {
            BrowseAction::Quit => return Ok(Ended::Outcome(())),
            BrowseAction::OpenExternal(name) => open_entry_externally(host, &reader, name).await,
            BrowseAction::PreviewJson(name) => preview_entry(host, ctx, &reader, name).await?,
            BrowseAction::OpenConversations => {
                host.suspend()?;
                let result = host
                    .run_nested(ctx.viewer_args("gpt", archive))
                    .await;
                host.resume()?;
                match result {
                    Ok(()) => Status::muted("Returned from GPT archive view"),
                    Err(e) => Status::error(format!("GPT view failed: {e}")),
                }
            }
        };
        screen.set_status(status);
    }
}

async fn extract<R>(reader: &R, name: String) -> Result<ScratchFile>
where
    R: ArchiveReader + Clone + 'static,
{
    let reader = reader.clone();
    blocking("extract entry", move || extract_to_scratch(&reader, &name)).await
}

async fn open_entry_externally<H, R>(host: &mut H, reader: &R, name: String) -> Status
where
    H: Host,
    R: ArchiveReader + Clone + 'static,
{
    match extract(reader, name.clone()).await {
        Ok(scratch) => {
            // The opener runs detached and may read the file at any time.
            let path = scratch.keep();
            if host.open_external(&path) {
                Status::success(format!("Opened externally: {name}"))
            } else {
                Status::error(format!(
                    "Open failed: no application could be started for {}",
                    path.display()
                ))
            }
        }
        Err(e) => Status::error(format!("Open failed: {e:#}")),
    }
}

async fn preview_entry<H, R>(
    host: &mut H,
    ctx: &AppContext,
    reader: &R,
    name: String,
) -> Result<Status>
where
    H: Host,
    R: ArchiveReader + Clone + 'static,
{
    let scratch = match extract(reader, name.clone()).await {
        Ok(scratch) => scratch,
        Err(e) => return Ok(Status::error(format!("Preview failed: {e:#}"))),
    };
    host.suspend()?;
    let result = host
        .run_nested(ctx.viewer_args("tree", scratch.path()))
        .await;
    host.resume()?;
    drop(scratch);
    Ok(match result {
        Ok(()) => Status::muted(format!("Closed preview: {name}")),
        Err(e) => Status::error(format!("Preview failed: {e}")),
    })
}

pub fn conversations_flow<H: Host>(
    host: &mut H,
    ctx: &AppContext,
    title: &str,
    conversations: Vec<Conversation>,
) -> Result<Ended<()>> {
    let mut screen = ConversationsScreen::new(title, conversations);
    loop {
        let action = match host.run(&mut screen, ctx.theme())? {
            Ended::Outcome(action) => action,
            Ended::Interrupted => return Ok(Ended::Interrupted),
        };
        match action {
            ConversationAction::Quit => return Ok(Ended::Outcome(())),
            ConversationAction::Open(index) => {
                let Some(conversation) = screen.conversation(index) else {
                    continue;
                };
                let mut transcript =
                    TranscriptScreen::new(conversation.label.clone(), conversation.messages());
                if let Ended::Interrupted = transcript_flow(host, ctx, &mut transcript)? {
                    return Ok(Ended::Interrupted);
                }
            }
            ConversationAction::Export(index) => {
                if let Some(conversation) = screen.conversation(index) {
                    let status =
                        export_status(ctx, &conversation.label, &conversation.messages());
                    screen.set_status(status);
                }
            }
        }
    }
}

fn transcript_flow<H: Host>(
    host: &mut H,
    ctx: &AppContext,
    screen: &mut TranscriptScreen,
) -> Result<Ended<()>> {
    loop {
        match host.run(screen, ctx.theme())? {
            Ended::Interrupted => return Ok(Ended::Interrupted),
            Ended::Outcome(TranscriptAction::Back) => return Ok(Ended::Outcome(())),
            Ended::Outcome(TranscriptAction::Export) => {
                let status = export_status(ctx, screen.title(), screen.messages());
                screen.set_status(status);
            }
        }
    }
}

fn export_status(ctx: &AppContext, title: &str, messages: &[Message]) -> Status {
    match export_plain(&ctx.config.export_dir, title, messages) {
        Ok(path) => Status::success(format!("Exported {}", path.display())),
        Err(e) => {
            tracing::warn!(error = %e, "export failed");
            Status::error(format!("Export failed: {e}"))
        }
    }
}
