//! Tabular report output.

use std::io::Write;

use tempo_core::Result;

/// Renders the decoded per-frame matrix as comma-separated text.
///
/// One header line of timer names, then one line per completed frame:
/// the frame index followed by every timer's value for that frame, in id
/// order. Values use scientific notation with enough digits to parse back
/// to the exact double that was logged. Once a row is written it is never
/// retracted.
pub struct ReportEmitter<W: Write> {
    out: W,
}

impl<W: Write> ReportEmitter<W> {
    /// Create an emitter over a byte sink.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the header line of timer names.
    pub fn write_header<'a, I>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut first = true;
        for name in names {
            if !first {
                write!(self.out, ",")?;
            }
            write!(self.out, "{name}")?;
            first = false;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Write one completed frame row.
    pub fn write_row(&mut self, frame: u64, values: &[f64]) -> Result<()> {
        write!(self.out, "{frame}")?;
        for value in values {
            write!(self.out, ",{value:e}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
