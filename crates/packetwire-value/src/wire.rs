//! Bounds-checked big-endian primitives.
//!
//! These are the untagged building blocks used by the tagged codec and by
//! payload codecs that write fields directly. Readers never panic on short
//! input; they return [`ValueError::Truncated`].

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::DEFAULT_MAX_STRING_LEN;
use crate::error::{Result, ValueError};

/// Largest length or count representable by the signed 4-byte prefix.
pub const MAX_WIRE_LEN: usize = i32::MAX as usize;

fn ensure(src: &Bytes, needed: usize) -> Result<()> {
    let remaining = src.remaining();
    if remaining < needed {
        return Err(ValueError::Truncated { needed, remaining });
    }
    Ok(())
}

pub fn get_u8(src: &mut Bytes) -> Result<u8> {
    ensure(src, 1)?;
    Ok(src.get_u8())
}

pub fn get_i8(src: &mut Bytes) -> Result<i8> {
    ensure(src, 1)?;
    Ok(src.get_i8())
}

/// Any non-zero byte reads as `true`.
pub fn get_bool(src: &mut Bytes) -> Result<bool> {
    Ok(get_u8(src)? != 0)
}

pub fn get_i16(src: &mut Bytes) -> Result<i16> {
    ensure(src, 2)?;
    Ok(src.get_i16())
}

pub fn get_u16(src: &mut Bytes) -> Result<u16> {
    ensure(src, 2)?;
    Ok(src.get_u16())
}

pub fn get_i32(src: &mut Bytes) -> Result<i32> {
    ensure(src, 4)?;
    Ok(src.get_i32())
}

pub fn get_i64(src: &mut Bytes) -> Result<i64> {
    ensure(src, 8)?;
    Ok(src.get_i64())
}

pub fn get_f32(src: &mut Bytes) -> Result<f32> {
    ensure(src, 4)?;
    Ok(src.get_f32())
}

pub fn get_f64(src: &mut Bytes) -> Result<f64> {
    ensure(src, 8)?;
    Ok(src.get_f64())
}

/// Read a 4-byte length or count and check it against `max`.
pub fn get_len(src: &mut Bytes, max: usize) -> Result<usize> {
    ensure(src, 4)?;
    let raw = src.get_i32();
    let len = usize::try_from(raw).map_err(|_| ValueError::LengthExceeded {
        len: raw as u32 as usize,
        max,
    })?;
    if len > max {
        return Err(ValueError::LengthExceeded { len, max });
    }
    Ok(len)
}

/// Write a 4-byte length or count.
pub fn put_len(dst: &mut BytesMut, len: usize) -> Result<()> {
    if len > MAX_WIRE_LEN {
        return Err(ValueError::LengthExceeded {
            len,
            max: MAX_WIRE_LEN,
        });
    }
    dst.put_i32(len as i32);
    Ok(())
}

/// Read a length-prefixed UTF-8 string using the default size limit.
pub fn get_string(src: &mut Bytes) -> Result<String> {
    get_string_bounded(src, DEFAULT_MAX_STRING_LEN)
}

/// Read a length-prefixed UTF-8 string of at most `max_len` bytes.
pub fn get_string_bounded(src: &mut Bytes, max_len: usize) -> Result<String> {
    let len = get_len(src, max_len)?;
    ensure(src, len)?;
    let body = src.split_to(len);
    Ok(String::from_utf8(body.to_vec())?)
}

/// Write a string as 4-byte length followed by its UTF-8 bytes.
pub fn put_string(dst: &mut BytesMut, value: &str) -> Result<()> {
    put_len(dst, value.len())?;
    dst.put_slice(value.as_bytes());
    Ok(())
}

/// Read a length-prefixed byte blob of at most `max_len` bytes.
pub fn get_blob(src: &mut Bytes, max_len: usize) -> Result<Bytes> {
    let len = get_len(src, max_len)?;
    ensure(src, len)?;
    Ok(src.split_to(len))
}

/// Write a byte blob as 4-byte length followed by its bytes.
pub fn put_blob(dst: &mut BytesMut, value: &[u8]) -> Result<()> {
    put_len(dst, value.len())?;
    dst.put_slice(value);
    Ok(())
}
