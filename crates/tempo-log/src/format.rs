//! Binary log framing.
//!
//! ```text
//! record := registrationRecord | sampleRecord
//! registrationRecord := int32(0) int32(id) int32(nameLen) byte[nameLen]
//! sampleRecord       := int32(id != 0) float64(value)
//! ```
//!
//! Integers are fixed 4-byte values and the sample value is an 8-byte
//! IEEE-754 double, all in the host's native byte order. The stream carries
//! no header, version, or endianness tag, so logs are only portable between
//! hosts of the same endianness.

use std::io::{self, Read, Write};

use tempo_core::constants::{MAX_NAME_LEN, MAX_TIMER_ID};
use tempo_core::{Error, Result, TimerId};

/// Leading int32 that marks a registration record.
pub const REGISTRATION_SENTINEL: i32 = 0;

/// Bytes in a sample record after its id.
pub(crate) const SAMPLE_PAYLOAD_LEN: i64 = 8;

pub(crate) fn write_i32<W: Write>(out: &mut W, value: i32) -> io::Result<()> {
    out.write_all(&value.to_ne_bytes())
}

pub(crate) fn write_f64<W: Write>(out: &mut W, value: f64) -> io::Result<()> {
    out.write_all(&value.to_ne_bytes())
}

pub(crate) fn read_i32<R: Read>(input: &mut R) -> io::Result<i32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(i32::from_ne_bytes(bytes))
}

pub(crate) fn read_f64<R: Read>(input: &mut R) -> io::Result<f64> {
    let mut bytes = [0u8; 8];
    input.read_exact(&mut bytes)?;
    Ok(f64::from_ne_bytes(bytes))
}

/// Whether a raw record id could name a timer in a well-formed log.
#[inline]
pub(crate) fn plausible_id(raw: i32) -> bool {
    raw > 0 && raw as u32 <= MAX_TIMER_ID
}

/// Whether a declared name length could belong to a well-formed record.
#[inline]
pub(crate) fn plausible_name_len(raw: i32) -> bool {
    raw >= 0 && raw as usize <= MAX_NAME_LEN
}

/// Write the registration record binding `id` to `name`.
pub fn write_registration<W: Write>(out: &mut W, id: TimerId, name: &str) -> Result<()> {
    if id.is_sentinel() || id.0 > MAX_TIMER_ID {
        return Err(Error::CorruptRecord(format!(
            "timer id {id} out of range for registration"
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::CorruptRecord(format!(
            "timer name of {} bytes exceeds the {MAX_NAME_LEN}-byte limit",
            name.len()
        )));
    }

    write_i32(out, REGISTRATION_SENTINEL)?;
    write_i32(out, id.0 as i32)?;
    write_i32(out, name.len() as i32)?;
    out.write_all(name.as_bytes())?;
    Ok(())
}

/// Write the sample record carrying `seconds` for `id`.
pub fn write_sample<W: Write>(out: &mut W, id: TimerId, seconds: f64) -> Result<()> {
    if id.is_sentinel() || id.0 > MAX_TIMER_ID {
        return Err(Error::CorruptRecord(format!(
            "timer id {id} out of range for sample"
        )));
    }

    write_i32(out, id.0 as i32)?;
    write_f64(out, seconds)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_layout() {
        let mut buf = Vec::new();
        write_registration(&mut buf, TimerId(3), "cull").unwrap();

        assert_eq!(buf.len(), 4 + 4 + 4 + 4);
        assert_eq!(&buf[0..4], &0i32.to_ne_bytes());
        assert_eq!(&buf[4..8], &3i32.to_ne_bytes());
        assert_eq!(&buf[8..12], &4i32.to_ne_bytes());
        assert_eq!(&buf[12..], b"cull");
    }

    #[test]
    fn sample_layout() {
        let mut buf = Vec::new();
        write_sample(&mut buf, TimerId(1), 0.016).unwrap();

        assert_eq!(buf.len(), 4 + 8);
        assert_eq!(&buf[0..4], &1i32.to_ne_bytes());
        assert_eq!(&buf[4..], &0.016f64.to_ne_bytes());
    }

    #[test]
    fn sentinel_id_is_rejected() {
        let mut buf = Vec::new();
        assert!(write_registration(&mut buf, TimerId::SENTINEL, "x").is_err());
        assert!(write_sample(&mut buf, TimerId::SENTINEL, 1.0).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_name_is_rejected() {
        let mut buf = Vec::new();
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(write_registration(&mut buf, TimerId(1), &name).is_err());
    }

    #[test]
    fn roundtrip_through_raw_reads() {
        let mut buf = Vec::new();
        write_sample(&mut buf, TimerId(7), 1.5e-3).unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        assert_eq!(read_i32(&mut cursor).unwrap(), 7);
        assert_eq!(read_f64(&mut cursor).unwrap().to_bits(), 1.5e-3f64.to_bits());
    }
}
