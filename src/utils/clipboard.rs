// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Clipboard hand-off through the platform's clipboard command.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::utils::error::PackError;

/// Clipboard commands in the order they are tried.
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Copy `text` to the system clipboard. Returns whether it succeeded.
pub fn copy_to_clipboard(text: &str) -> bool {
    match try_copy(text) {
        Ok(program) => {
            tracing::debug!("Copied {} bytes to clipboard via {}", text.len(), program);
            true
        }
        Err(e) => {
            tracing::warn!("{}", e);
            false
        }
    }
}

fn try_copy(text: &str) -> Result<&'static str, PackError> {
    let mut last_error = None;

    for &(program, args) in CLIPBOARD_COMMANDS {
        let Ok(path) = which::which(program) else {
            continue;
        };
        match pipe_to(&path, args, text) {
            Ok(()) => return Ok(program),
            Err(e) => {
                tracing::debug!("Clipboard command {} failed: {}", program, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        PackError::Clipboard(
            "no clipboard command found (tried pbcopy, wl-copy, xclip, xsel, clip)".to_string(),
        )
    }))
}

fn pipe_to(program: &std::path::Path, args: &[&str], text: &str) -> Result<(), PackError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Always reap the child, even when it hung up on us mid-write.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;

    if status.success() {
        Ok(())
    } else {
        Err(PackError::Clipboard(format!(
            "{} exited with {}",
            program.display(),
            status
        )))
    }
}
