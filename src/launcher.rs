//! # Child Processes
//!
//! Two kinds of children are spawned:
//!
//! - the platform's default handler for a file (`open`, `xdg-open`, ...),
//!   detached and fire-and-forget
//! - a nested viewer, which is this executable re-run with another
//!   subcommand on the same terminal; the caller suspends its own terminal
//!   session and awaits it

use crate::error::ToolError;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};

/// Candidate openers for the current platform, tried in order until one
/// can be spawned.
pub fn opener_candidates(path: &Path) -> Vec<(&'static str, Vec<OsString>)> {
    let target = path.as_os_str().to_os_string();
    if cfg!(target_os = "macos") {
        vec![("open", vec![target])]
    } else if cfg!(windows) {
        vec![(
            "cmd",
            vec!["/c".into(), "start".into(), "".into(), target],
        )]
    } else {
        vec![
            ("xdg-open", vec![target.clone()]),
            ("gio", vec!["open".into(), target.clone()]),
            ("gnome-open", vec![target.clone()]),
            ("kde-open", vec![target.clone()]),
            ("wslview", vec![target]),
        ]
    }
}

fn spawn_detached(program: &str, args: &[OsString]) -> bool {
    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            // Reap the opener so it does not linger as a zombie.
            std::thread::spawn(move || {
                let _ = child.wait();
            });
            true
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "opener unavailable");
            false
        }
    }
}

/// Hand `path` to the platform's default application. Best effort: returns
/// whether an opener could be started and never fails.
pub fn open_with_default_handler(path: &Path) -> bool {
    let opened = opener_candidates(path)
        .iter()
        .any(|(program, args)| spawn_detached(program, args));
    if opened {
        tracing::info!(path = %path.display(), "opened with default handler");
    } else {
        tracing::warn!(path = %path.display(), "no default handler could be started");
    }
    opened
}

/// Run `program` with inherited stdio and wait for it. A spawn failure or a
/// non-zero exit is a [`ToolError::ChildProcess`].
pub async fn run_inherited<I, S>(program: &OsStr, args: I, label: &str) -> Result<(), ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let status = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| ToolError::ChildProcess {
            detail: format!("{label}: {e}"),
        })?;

    if status.success() {
        Ok(())
    } else {
        let code = status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Err(ToolError::ChildProcess {
            detail: format!("{label} exit {code}"),
        })
    }
}

/// Re-run this executable with `args` (a subcommand and its operands) on
/// the shared terminal.
pub async fn run_nested_viewer(args: &[OsString]) -> Result<(), ToolError> {
    let exe = std::env::current_exe().map_err(|e| ToolError::ChildProcess {
        detail: format!("cannot locate own executable: {e}"),
    })?;
    let label = args
        .first()
        .map_or_else(|| "viewer".to_string(), |a| a.to_string_lossy().into_owned());
    tracing::debug!(exe = %exe.display(), ?args, "starting nested viewer");
    run_inherited(exe.as_os_str(), args, &label).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_candidates_end_with_target() {
        let path = Path::new("/tmp/some file.json");
        let candidates = opener_candidates(path);
        assert!(!candidates.is_empty());
        for (_, args) in &candidates {
            assert_eq!(args.last().map(OsString::as_os_str), Some(path.as_os_str()));
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_unix_opener_order() {
        let names: Vec<&str> = opener_candidates(Path::new("x"))
            .into_iter()
            .map(|(program, _)| program)
            .collect();
        assert_eq!(
            names,
            vec!["xdg-open", "gio", "gnome-open", "kde-open", "wslview"]
        );
    }

    #[test]
    fn test_spawn_detached_missing_program() {
        assert!(!spawn_detached("zipscope-no-such-opener", &[]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_inherited_success() {
        run_inherited(OsStr::new("sh"), ["-c", "exit 0"], "sh")
            .await
            .expect("exit 0 is success");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_inherited_non_zero_exit() {
        let err = run_inherited(OsStr::new("sh"), ["-c", "exit 3"], "tree")
            .await
            .expect_err("exit 3 fails");
        assert_eq!(err.kind(), "ERR_CHILD_PROCESS");
        assert_eq!(err.hint(), "tree exit 3");
    }

    #[tokio::test]
    async fn test_run_inherited_spawn_failure() {
        let err = run_inherited(
            OsStr::new("zipscope-no-such-program"),
            std::iter::empty::<&str>(),
            "viewer",
        )
        .await
        .expect_err("missing program");
        assert_eq!(err.kind(), "ERR_CHILD_PROCESS");
        assert!(err.hint().starts_with("viewer: "));
    }
}
