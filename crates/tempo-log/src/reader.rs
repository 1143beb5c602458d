//! Two-pass offline log decoding.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tempo_core::{Result, TimerId};

use crate::format::{
    plausible_id, plausible_name_len, read_f64, read_i32, REGISTRATION_SENTINEL,
    SAMPLE_PAYLOAD_LEN,
};
use crate::report::ReportEmitter;

/// Frame-boundary heuristic.
///
/// The stream carries no explicit frame delimiter: a new frame is inferred
/// when a sample arrives for a slot that already holds a nonzero value and
/// itself carries a nonzero value. The signal is structurally ambiguous:
/// a legitimate zero-duration sample is indistinguishable from a slot that
/// was never written, and a timer's second nonzero sample within one frame
/// forces a spurious flush. Kept bit-for-bit for format compatibility; a
/// future delimiter record only needs to replace this one function.
#[inline]
#[must_use]
pub fn begins_new_frame(previous: f64, incoming: f64) -> bool {
    previous != 0.0 && incoming != 0.0
}

/// Id → name mapping discovered in the decoder's first pass.
///
/// Slots exist for every id in `0..=max_id`, including ids that were
/// sampled but never registered; those read back as unset.
pub struct NameTable {
    names: Vec<Option<String>>,
}

impl NameTable {
    /// Highest timer id seen in the stream.
    #[must_use]
    pub fn max_id(&self) -> u32 {
        (self.names.len() - 1) as u32
    }

    /// The name registered for `id`, if any.
    #[must_use]
    pub fn name(&self, id: TimerId) -> Option<&str> {
        self.names.get(id.index()).and_then(Option::as_deref)
    }

    /// Report column names for ids `1..=max_id`, empty for unregistered
    /// slots.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names
            .iter()
            .skip(1)
            .map(|slot| slot.as_deref().unwrap_or(""))
    }

    fn slot_count(&self) -> usize {
        self.names.len()
    }
}

/// What a decode pass produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeSummary {
    /// Completed frames flushed to the report.
    pub frames: u64,
    /// Highest timer id seen (report column count).
    pub timers: u32,
    /// Records skipped as corrupt.
    pub corrupt_records: u64,
}

/// Offline batch decoder for the binary frame log.
///
/// Two sequential passes over the input, both from the start: pass one
/// discovers the id → name mapping and the highest id, pass two replays
/// sample records into an accumulator row and flushes a report line at
/// every inferred frame boundary. Memory scales with the highest id, never
/// with file length.
pub struct LogReader<R> {
    input: R,
    corrupt: u64,
}

impl<R: Read + Seek> LogReader<R> {
    /// Create a decoder over a seekable byte source.
    #[must_use]
    pub fn new(input: R) -> Self {
        Self { input, corrupt: 0 }
    }

    /// Pass one: scan every record for name registrations.
    ///
    /// Records with an implausible id or declared name length are skipped
    /// by their own declared span and counted, never fatal. A record
    /// truncated by end-of-stream ends the pass.
    pub fn scan_names(&mut self) -> Result<NameTable> {
        self.input.seek(SeekFrom::Start(0))?;
        let mut names: Vec<Option<String>> = vec![None];

        loop {
            let Some(tag) = read_i32_opt(&mut self.input)? else {
                break;
            };

            if tag == REGISTRATION_SENTINEL {
                let Some(raw_id) = read_i32_opt(&mut self.input)? else {
                    break;
                };
                let Some(raw_len) = read_i32_opt(&mut self.input)? else {
                    break;
                };

                if !plausible_id(raw_id) || !plausible_name_len(raw_len) {
                    tracing::warn!(
                        "skipping corrupt registration record (id {raw_id}, name length {raw_len})"
                    );
                    self.corrupt += 1;
                    skip_forward(&mut self.input, i64::from(raw_len.max(0)))?;
                    continue;
                }

                let mut name = vec![0u8; raw_len as usize];
                if self.input.read_exact(&mut name).is_err() {
                    break;
                }

                let idx = raw_id as usize;
                if names.len() <= idx {
                    names.resize(idx + 1, None);
                }
                // Names are immutable once bound; a duplicate registration
                // keeps the first binding.
                let slot = &mut names[idx];
                if slot.is_none() {
                    *slot = Some(String::from_utf8_lossy(&name).into_owned());
                }
            } else {
                if plausible_id(tag) {
                    let idx = tag as usize;
                    if names.len() <= idx {
                        names.resize(idx + 1, None);
                    }
                } else {
                    tracing::warn!("skipping sample record with implausible id {tag}");
                    self.corrupt += 1;
                }
                skip_forward(&mut self.input, SAMPLE_PAYLOAD_LEN)?;
            }
        }

        Ok(NameTable { names })
    }

    /// Decode the whole log, writing the CSV report to `output`.
    ///
    /// A trailing frame the stream never closed is dropped, not emitted.
    pub fn decode_into<W: Write>(mut self, output: W) -> Result<DecodeSummary> {
        let names = self.scan_names()?;

        let mut emitter = ReportEmitter::new(output);
        emitter.write_header(names.column_names())?;

        self.input.seek(SeekFrom::Start(0))?;
        let mut row = vec![0.0_f64; names.slot_count()];
        let mut frames = 0u64;

        loop {
            let Some(tag) = read_i32_opt(&mut self.input)? else {
                break;
            };

            if tag == REGISTRATION_SENTINEL {
                // Consumed in pass one; advance by the same declared span.
                if read_i32_opt(&mut self.input)?.is_none() {
                    break;
                }
                let Some(raw_len) = read_i32_opt(&mut self.input)? else {
                    break;
                };
                skip_forward(&mut self.input, i64::from(raw_len.max(0)))?;
                continue;
            }

            let Some(value) = read_f64_opt(&mut self.input)? else {
                break;
            };
            let Ok(idx) = usize::try_from(tag) else {
                continue;
            };
            if idx == 0 || idx >= row.len() {
                continue;
            }

            if begins_new_frame(row[idx], value) {
                emitter.write_row(frames, &row[1..])?;
                row.fill(0.0);
                frames += 1;
            }
            row[idx] = value;
        }

        if row.iter().any(|v| *v != 0.0) {
            tracing::debug!("dropping incomplete trailing frame");
        }

        emitter.finish()?;
        Ok(DecodeSummary {
            frames,
            timers: names.max_id(),
            corrupt_records: self.corrupt,
        })
    }
}

/// Read an i32, mapping clean end-of-stream to `None`.
fn read_i32_opt<R: Read>(input: &mut R) -> Result<Option<i32>> {
    match read_i32(input) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Read an f64, mapping end-of-stream to `None`.
fn read_f64_opt<R: Read>(input: &mut R) -> Result<Option<f64>> {
    match read_f64(input) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Advance past a record's payload without buffering it.
///
/// Seeking may land past end-of-stream; the next read then reports a clean
/// end.
fn skip_forward<R: Seek>(input: &mut R, bytes: i64) -> Result<()> {
    input.seek(SeekFrom::Current(bytes))?;
    Ok(())
}
