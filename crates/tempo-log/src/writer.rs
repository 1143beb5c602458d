//! Frame-by-frame log serialization.

use std::io::Write;

use tempo_core::{Result, TimerId};
use tempo_timing::TimerRegistry;

use crate::format::{write_registration, write_sample};

/// Serializes registry snapshots into the binary log, one call per frame.
///
/// Registration records are emitted lazily: the first frame in which an id
/// appears carries its name binding, every later frame carries only the
/// sample. Records are append-only and never rewritten, and a frame costs
/// O(registered timers), so the call stays off the frame loop's critical
/// path.
pub struct LogWriter<W: Write> {
    out: W,
    announced: Vec<bool>,
    frames: u64,
}

impl<W: Write> LogWriter<W> {
    /// Create a writer over a byte sink.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            announced: Vec::new(),
            frames: 0,
        }
    }

    /// Serialize one frame: every registered timer's accumulated total, in
    /// id order, preceded by a registration record for any id the stream
    /// has not seen yet.
    ///
    /// The caller still owns the end-of-frame `reset_all` on the registry;
    /// the writer only reads.
    pub fn write_frame(&mut self, registry: &TimerRegistry) -> Result<()> {
        for (id, name, seconds) in registry.entries() {
            if !self.is_announced(id) {
                write_registration(&mut self.out, id, name)?;
                self.mark_announced(id);
            }
            write_sample(&mut self.out, id, seconds)?;
        }
        self.frames += 1;
        Ok(())
    }

    /// Write a single sample record outside the per-frame path.
    ///
    /// The id must already have been announced via a `write_frame` that
    /// included it; otherwise the decoder will report an unnamed column.
    pub fn write_sample(&mut self, id: TimerId, seconds: f64) -> Result<()> {
        write_sample(&mut self.out, id, seconds)
    }

    /// Frames serialized so far.
    #[must_use]
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn is_announced(&self, id: TimerId) -> bool {
        self.announced.get(id.index()).copied().unwrap_or(false)
    }

    fn mark_announced(&mut self, id: TimerId) {
        if self.announced.len() <= id.index() {
            self.announced.resize(id.index() + 1, false);
        }
        self.announced[id.index()] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::REGISTRATION_SENTINEL;

    fn raw_i32(bytes: &[u8], at: usize) -> i32 {
        i32::from_ne_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn first_frame_announces_then_samples() {
        let mut registry = TimerRegistry::new();
        registry.timer("dt");

        let mut writer = LogWriter::new(Vec::new());
        writer.write_frame(&registry).unwrap();
        writer.write_frame(&registry).unwrap();
        assert_eq!(writer.frames_written(), 2);

        let bytes = writer.into_inner().unwrap();
        // Frame 1: registration (4+4+4+2) then sample (4+8); frame 2: sample only.
        assert_eq!(bytes.len(), 14 + 12 + 12);
        assert_eq!(raw_i32(&bytes, 0), REGISTRATION_SENTINEL);
        assert_eq!(raw_i32(&bytes, 4), 1);
        assert_eq!(raw_i32(&bytes, 8), 2);
        assert_eq!(&bytes[12..14], b"dt");
        assert_eq!(raw_i32(&bytes, 14), 1);
        assert_eq!(raw_i32(&bytes, 26), 1);
    }

    #[test]
    fn late_registration_is_announced_in_its_first_frame() {
        let mut registry = TimerRegistry::new();
        registry.timer("dt");

        let mut writer = LogWriter::new(Vec::new());
        writer.write_frame(&registry).unwrap();

        registry.timer("cull");
        writer.write_frame(&registry).unwrap();

        let bytes = writer.into_inner().unwrap();
        // Frame 2 starts after frame 1's 14 + 12 bytes: sample(1), then
        // cull's registration, then sample(2).
        let frame2 = &bytes[26..];
        assert_eq!(raw_i32(frame2, 0), 1);
        assert_eq!(raw_i32(frame2, 12), REGISTRATION_SENTINEL);
        assert_eq!(raw_i32(frame2, 16), 2);
        assert_eq!(raw_i32(frame2, 20), 4);
        assert_eq!(&frame2[24..28], b"cull");
        assert_eq!(raw_i32(frame2, 28), 2);
    }

    #[test]
    fn empty_registry_writes_nothing_but_counts_the_frame() {
        let registry = TimerRegistry::new();
        let mut writer = LogWriter::new(Vec::<u8>::new());
        writer.write_frame(&registry).unwrap();

        assert_eq!(writer.frames_written(), 1);
        assert!(writer.into_inner().unwrap().is_empty());
    }
}
