//! Interactive chat loop.
//!
//! Reads one line at a time, runs it to completion, then reads the next.
//! Lines matching a command word (case-insensitive) are commands; anything
//! else is a question for the currently loaded brain. No error inside the
//! loop ends it; only `exit` or end of input does.

use anyhow::Result;
use chrono::Local;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::coordinator::{BrainHandle, Coordinator};
use crate::models::IndexSummary;
use crate::progress::{ProgressEvent, ProgressReporter};

const HELP_TEXT: &str = "\
Available Commands:
  help    Show this help message
  exit    Exit the chat
  clear   Clear the screen
  info    Show brain information
  status  Show storage status
  reload  Reload the repository";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Clear,
    Info,
    Status,
    Reload,
    Ask(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Command::Empty,
            "help" => Command::Help,
            "exit" => Command::Exit,
            "clear" => Command::Clear,
            "info" => Command::Info,
            "status" => Command::Status,
            "reload" => Command::Reload,
            _ => Command::Ask(trimmed.to_string()),
        }
    }
}

pub struct ChatSession {
    coordinator: Coordinator,
    root: PathBuf,
    handle: Option<BrainHandle>,
    progress: Box<dyn ProgressReporter>,
}

impl ChatSession {
    pub fn new(coordinator: Coordinator, root: PathBuf, progress: Box<dyn ProgressReporter>) -> Self {
        Self {
            coordinator,
            root,
            handle: None,
            progress,
        }
    }

    pub fn handle(&self) -> Option<&BrainHandle> {
        self.handle.as_ref()
    }

    /// Resolve the brain for the session root.
    ///
    /// The held handle is replaced only on success; a failed resolve keeps
    /// the previous one, if any.
    pub async fn load(&mut self, out: &mut impl Write, event: ProgressEvent) -> Result<bool> {
        self.progress.report(event);
        match self.coordinator.resolve(&self.root).await {
            Ok(handle) => {
                self.progress.report(ProgressEvent::Done { ok: true });
                writeln!(
                    out,
                    "Brain ready: {} ({} cache, {} files)",
                    handle.id,
                    handle.outcome,
                    handle.files.len()
                )?;
                self.handle = Some(handle);
                Ok(true)
            }
            Err(e) => {
                self.progress.report(ProgressEvent::Done { ok: false });
                writeln!(out, "Error: failed to initialize brain: {}", e)?;
                if let Some(previous) = &self.handle {
                    writeln!(out, "Keeping previous brain: {}", previous.id)?;
                }
                Ok(false)
            }
        }
    }

    /// Run the loop until `exit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Welcome to Repository Assistant!")?;
        writeln!(
            out,
            "Type your questions and I'll help you find answers from the repository."
        )?;
        writeln!(out, "Type 'exit' to quit, 'help' for commands.")?;

        self.load(out, ProgressEvent::Initializing).await?;

        let mut lines = input.lines();
        loop {
            write!(out, "\nYou: ")?;
            out.flush()?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };

            match Command::parse(&line) {
                Command::Empty => continue,
                Command::Exit => {
                    writeln!(out, "Goodbye!")?;
                    break;
                }
                Command::Help => writeln!(out, "{}", HELP_TEXT)?,
                Command::Clear => {
                    write!(out, "\x1b[2J\x1b[H")?;
                    out.flush()?;
                }
                Command::Info => self.show_info(out)?,
                Command::Status => self.show_status(out).await?,
                Command::Reload => {
                    self.load(out, ProgressEvent::Reloading).await?;
                }
                Command::Ask(question) => self.ask(&question, out).await?,
            }
        }

        Ok(())
    }

    fn show_info(&self, out: &mut impl Write) -> Result<()> {
        let handle = match &self.handle {
            Some(handle) => handle,
            None => {
                writeln!(out, "No brain loaded. Use 'reload' to try again.")?;
                return Ok(());
            }
        };

        writeln!(out, "Brain Information:")?;
        writeln!(out, "  Name:        {}", handle.name)?;
        writeln!(out, "  ID:          {}", handle.id)?;
        writeln!(out, "  Fingerprint: {}", handle.fingerprint)?;
        writeln!(out, "  Cache:       {}", handle.outcome)?;
        writeln!(out, "  Engine:      {}", handle.describe())?;
        writeln!(
            out,
            "  Settings:    model={}, temperature={}, max_tokens={}, parser={}",
            handle.settings.model,
            handle.settings.temperature,
            handle.settings.max_tokens,
            handle.settings.parser
        )?;
        writeln!(out, "  Files ({}):", handle.files.len())?;
        for file in &handle.files {
            writeln!(out, "    {}", file.display())?;
        }
        Ok(())
    }

    async fn show_status(&self, out: &mut impl Write) -> Result<()> {
        match self.coordinator.store().list_all().await {
            Ok(records) => write!(out, "{}", render_status(&records))?,
            Err(e) => writeln!(out, "Error: failed to read storage status: {}", e)?,
        }
        Ok(())
    }

    async fn ask(&self, question: &str, out: &mut impl Write) -> Result<()> {
        let handle = match &self.handle {
            Some(handle) => handle,
            None => {
                writeln!(
                    out,
                    "Error: no brain loaded, cannot answer. Use 'reload' to try again."
                )?;
                return Ok(());
            }
        };

        self.progress.report(ProgressEvent::Thinking);
        let started = Instant::now();
        match handle.answer(question).await {
            Ok(answer) => {
                writeln!(out, "\nAssistant: {}", answer)?;
                writeln!(
                    out,
                    "\nProcessing time: {:.2} seconds",
                    started.elapsed().as_secs_f64()
                )?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "question failed");
                writeln!(out, "Error during question processing: {}", e)?;
            }
        }
        Ok(())
    }
}

/// Storage status block: a header, then one line per record.
pub fn render_status(records: &[IndexSummary]) -> String {
    let mut text = String::from("Stored Brains:\n");
    for record in records {
        text.push_str(&format!(
            "- ID: {}, Name: {}, Created At: {}, Hash: {}\n",
            record.id,
            record.name,
            record
                .created_at
                .with_timezone(&Local)
                .format("%a %b %e %H:%M:%S %Y"),
            record.fingerprint
        ));
    }
    text
}
