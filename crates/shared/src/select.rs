//! Process boundaries: the interactive selector and the media player.

use anyhow::{Context, Result};
use regex::Regex;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::CommandSpec;
use crate::models::Item;
use crate::present::Rendered;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"));

/// What came back from the selector
#[derive(Debug)]
pub enum Selection {
    Selected(Item),
    /// No match, or the user backed out
    Cancelled,
    Failed(anyhow::Error),
}

pub struct Selector {
    command: CommandSpec,
}

impl Selector {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }

    /// Pipe the rendered lines through the selector and map its answer back.
    ///
    /// Exit status 2 is the selector's own error; every other non-zero
    /// status (no match, Ctrl-C, Esc) counts as nothing selected.
    pub async fn select(&self, rendered: &Rendered) -> Selection {
        match self.run(rendered).await {
            Ok(selection) => selection,
            Err(e) => Selection::Failed(e),
        }
    }

    async fn run(&self, rendered: &Rendered) -> Result<Selection> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to start {}", self.command.program))?;

        // Feed stdin while stdout is being drained, so a large list can't
        // deadlock against a full pipe.
        let input = rendered.display_text();
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                let result = stdin.write_all(input.as_bytes()).await;
                drop(stdin);
                result
            })
        });

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for {}", self.command.program))?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(e).context("Failed to write to selector");
                }
                _ => {}
            }
        }

        match output.status.code() {
            Some(0) => {}
            Some(2) => anyhow::bail!("{} exited with an error (status 2)", self.command.program),
            code => {
                debug!(?code, "Selector returned without a selection");
                return Ok(Selection::Cancelled);
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or("").trim_end();
        if line.is_empty() {
            return Ok(Selection::Cancelled);
        }

        let plain = ANSI_ESCAPE.replace_all(line, "");
        match rendered.item_for(&plain) {
            Some(item) => Ok(Selection::Selected(item.clone())),
            None => anyhow::bail!("url not found for selection: {:?}", plain),
        }
    }
}

pub struct Player {
    command: CommandSpec,
}

impl Player {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }

    /// Run the player on the item's URL with the terminal passed through
    pub async fn play(&self, item: &Item) -> Result<()> {
        let status = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(&item.media_url)
            .status()
            .await
            .with_context(|| format!("Failed to start {}", self.command.program))?;

        if !status.success() {
            anyhow::bail!("{} exited with {}", self.command.program, status);
        }
        Ok(())
    }
}
