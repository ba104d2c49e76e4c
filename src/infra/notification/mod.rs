//! Desktop notifications.
//!
//! Uses terminal-notifier when it is installed, since it can open a URL on
//! click. Falls back to notify-rust otherwise.

mod types;

pub use types::Notification;

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use notify_rust::Notification as RustNotification;

const TERMINAL_NOTIFIER: &str = "terminal-notifier";

/// Sends a notification using the best available method.
pub fn send(notification: &Notification) -> Result<()> {
    if find_command_path(TERMINAL_NOTIFIER).is_some() {
        send_terminal_notifier(notification)
    } else {
        send_fallback(notification)
    }
}

fn send_terminal_notifier(notification: &Notification) -> Result<()> {
    let output = Command::new(TERMINAL_NOTIFIER)
        .args(terminal_notifier_args(notification))
        .output()
        .context("failed to run terminal-notifier")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("terminal-notifier failed: {stderr}");
    }
    Ok(())
}

fn terminal_notifier_args(notification: &Notification) -> Vec<String> {
    let mut args = vec![
        "-title".to_string(),
        notification.title().to_string(),
        "-message".to_string(),
        notification.message().to_string(),
    ];
    if let Some(url) = notification.url() {
        args.push("-open".to_string());
        args.push(url.to_string());
    }
    args
}

fn send_fallback(notification: &Notification) -> Result<()> {
    RustNotification::new()
        .summary(notification.title())
        .body(&fallback_body(notification))
        .show()
        .context("failed to send notification via notify-rust")?;
    Ok(())
}

/// notify-rust cannot open URLs on click, so the URL goes into the body.
fn fallback_body(notification: &Notification) -> String {
    match notification.url() {
        Some(url) => format!("{}\n{url}", notification.message()),
        None => notification.message().to_string(),
    }
}

/// Find the full path of an executable in PATH.
fn find_command_path(cmd: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(cmd))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && path
            .metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
