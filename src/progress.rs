//! Progress reporting for long-running engine calls.
//!
//! Progress goes to **stderr** so stdout stays the chat transcript. It is on
//! by default only when stderr is a TTY.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgressEvent {
    Initializing,
    Reloading,
    Thinking,
    Done { ok: bool },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly status lines on stderr.
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match event {
            ProgressEvent::Initializing => "Initializing brain...",
            ProgressEvent::Reloading => "Reloading brain...",
            ProgressEvent::Thinking => "Thinking...",
            ProgressEvent::Done { ok: true } => "Brain ready.",
            ProgressEvent::Done { ok: false } => "Brain unavailable.",
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
        let _ = stderr.flush();
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
}

impl ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
        }
    }
}
