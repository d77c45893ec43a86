use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use churnscope_data::selection::FilterSelection;

/// Where a command writes its report: stdout, or the file given by
/// `--output`.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout(_) => f.write_str("stdout"),
            Output::File { path, .. } => fmt::Display::fmt(&path.display(), f),
        }
    }
}

impl Output {
    /// Creates (or truncates) the report file, falling back to stdout.
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Output::Stdout(io::stdout().lock()));
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        Ok(Output::File {
            path: path.to_owned(),
            writer: BufWriter::new(file),
        })
    }

    /// Writes `value` as pretty JSON followed by a newline.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self))
            .with_context(|| format!("Failed to write JSON report to {self}"))?;
        self.finish()
    }

    /// Writes a text report produced by `report`.
    pub fn write_report<F>(&mut self, report: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        report(self).with_context(|| format!("Failed to write report to {self}"))?;
        self.finish()
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush report to {self}"))?;
        if let Output::File { path, .. } = self {
            eprintln!("Report written to {}", path.display());
        }
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(out) => out.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(out) => out.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Reads a filter selection saved as JSON.
pub fn read_selection_file(path: &Path) -> anyhow::Result<FilterSelection> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open selection file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid filter selection in {}", path.display()))
}

/// Formats a fraction as a percentage with one decimal.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
