//! Per-unit report sections.
//!
//! A section is a blank line, a ruler, the unit directory relative to the
//! working directory, another ruler, then the captured check output. Units
//! whose checks printed nothing get no section at all.

use crate::discovery::Unit;
use console::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Captured output of one unit's batch. Drained by [`ReportBuffer::fetch`].
#[derive(Debug, Default)]
pub struct ReportBuffer {
    buf: Vec<u8>,
}

impl ReportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything captured so far, leaving the buffer empty.
    pub fn fetch(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buf);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for ReportBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct ReportRenderer {
    cwd: PathBuf,
    ruler_length: usize,
}

impl ReportRenderer {
    pub fn new(cwd: impl Into<PathBuf>, ruler_length: usize) -> Self {
        Self {
            cwd: cwd.into(),
            ruler_length,
        }
    }

    /// A renderer whose ruler fits the longest unit directory, and is never
    /// shorter than `min_length`.
    pub fn for_units(units: &[Unit], cwd: impl Into<PathBuf>, min_length: usize) -> Self {
        let cwd = cwd.into();
        let ruler_length = units
            .iter()
            .map(|u| relativize(u.directory(), &cwd).chars().count())
            .fold(min_length, usize::max);
        Self::new(cwd, ruler_length)
    }

    pub fn ruler_length(&self) -> usize {
        self.ruler_length
    }

    /// Section title for `unit_dir`. The working directory itself is shown as
    /// `../<name>` so the root unit still has a recognisable header.
    pub fn title(&self, unit_dir: &Path) -> String {
        let title = relativize(unit_dir, &self.cwd);
        if title == "." {
            let name = unit_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            format!("../{}", name)
        } else {
            title
        }
    }

    /// Write the section for `unit_dir`. Does nothing when `content` is empty.
    pub fn render(&self, content: &str, unit_dir: &Path, out: &mut dyn Write) -> io::Result<()> {
        if content.is_empty() {
            return Ok(());
        }

        let ruler = style("=".repeat(self.ruler_length)).green();
        writeln!(out)?;
        writeln!(out, "{}", ruler)?;
        writeln!(out, "{}", self.title(unit_dir))?;
        writeln!(out, "{}", ruler)?;
        out.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }
}

/// `path` with the `cwd` prefix replaced by `.`; unchanged when outside `cwd`.
fn relativize(path: &Path, cwd: &Path) -> String {
    match path.strip_prefix(cwd) {
        Ok(rest) if rest.as_os_str().is_empty() => ".".to_string(),
        Ok(rest) => format!("./{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}
