//! Output formatting for command results.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use sentinel_lib::RenderMode;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text for terminals.
    #[default]
    Text,
    /// Markdown.
    Rich,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Text render mode for this format, `None` for JSON.
    pub fn render_mode(self) -> Option<RenderMode> {
        match self {
            OutputFormat::Text => Some(RenderMode::PlainText),
            OutputFormat::Rich => Some(RenderMode::RichText),
            OutputFormat::Json => None,
        }
    }
}

/// Write `value` in the requested format to stdout.
///
/// `render` produces the textual form; JSON uses the serde representation.
pub fn emit<T, F>(format: OutputFormat, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(RenderMode) -> String,
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_output(&mut handle, format, value, render)
}

/// Write `value` in the requested format to `writer`.
pub fn write_output<W, T, F>(writer: &mut W, format: OutputFormat, value: &T, render: F) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
    F: FnOnce(RenderMode) -> String,
{
    match format.render_mode() {
        Some(mode) => writer
            .write_all(render(mode).as_bytes())
            .context("failed to write output")?,
        None => {
            serde_json::to_writer_pretty(&mut *writer, value)
                .context("failed to serialize output as JSON")?;
            writeln!(writer).context("failed to write output")?;
        }
    }
    Ok(())
}
