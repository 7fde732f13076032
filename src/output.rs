// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::ssh::CommandOutput;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages and banners
    Normal,
    /// Minimal output for CI (results only)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
                ..JsonEvent::default()
            }),
        }
    }

    /// One line of a listing. Printed in every mode.
    pub fn entry(&self, line: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{line}"),
            OutputMode::Json => emit(&JsonEvent {
                event: "entry",
                message: line,
                ..JsonEvent::default()
            }),
        }
    }

    /// Raw text such as a managed region, written exactly as given.
    pub fn text(&self, text: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => print!("{text}"),
            OutputMode::Json => emit(&JsonEvent {
                event: "text",
                message: text,
                ..JsonEvent::default()
            }),
        }
    }

    /// Output of a script or remote command, framed by banners in normal mode.
    pub fn framed(&self, label: &str, result: &CommandOutput) {
        match self.mode {
            OutputMode::Normal => {
                println!("\n--- Begin {label} ---");
                print!("{}", result.stdout);
                if !result.stdout.is_empty() && !result.stdout.ends_with('\n') {
                    println!();
                }
                println!("--- End {label} ---");
                eprint!("{}", result.stderr);
            }
            OutputMode::Quiet => {
                print!("{}", result.stdout);
                eprint!("{}", result.stderr);
            }
            OutputMode::Json => emit(&JsonEvent {
                event: "output",
                message: label,
                stdout: Some(&result.stdout),
                stderr: Some(&result.stderr),
                exit_code: Some(result.exit_code),
                signal: result.signal.as_deref(),
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => emit_err(&JsonEvent {
                event: "warning",
                message,
                ..JsonEvent::default()
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => emit_err(&JsonEvent {
                event: "error",
                message,
                duration_secs: self.duration(),
                ..JsonEvent::default()
            }),
        }
    }

    /// Print follow-up advice for an error (suppressed in quiet mode).
    pub fn hint(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Hint: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => emit_err(&JsonEvent {
                event: "hint",
                message,
                ..JsonEvent::default()
            }),
        }
    }
}

fn emit(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

fn emit_err(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        eprintln!("{json}");
    }
}

#[derive(Serialize, Default)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
