use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix ahead of every frame on a byte stream: 4 bytes big-endian.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Append a length-delimited frame to `dst`.
///
/// Stream layout:
/// ```text
/// ┌──────────────┬───────────────┬──────────────────┐
/// │ Length (4B)  │ Discriminator │ Payload          │
/// │ big-endian   │ (1B)          │ (Length - 1 B)   │
/// └──────────────┴───────────────┴──────────────────┘
/// ```
pub fn encode_delimited(frame: &[u8], max_frame_size: usize, dst: &mut BytesMut) -> Result<()> {
    if frame.len() > max_frame_size || frame.len() > u32::MAX as usize {
        return Err(FrameError::FrameTooLarge {
            size: frame.len(),
            max: max_frame_size,
        });
    }
    dst.reserve(LENGTH_PREFIX_SIZE + frame.len());
    dst.put_u32(frame.len() as u32);
    dst.put_slice(frame);
    Ok(())
}

/// Split one length-delimited frame off the front of `src`.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
pub fn decode_delimited(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Bytes>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    prefix.copy_from_slice(&src[..LENGTH_PREFIX_SIZE]);
    let frame_len = u32::from_be_bytes(prefix) as usize;

    if frame_len > max_frame_size {
        return Err(FrameError::FrameTooLarge {
            size: frame_len,
            max: max_frame_size,
        });
    }

    if src.len() < LENGTH_PREFIX_SIZE + frame_len {
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Ok(Some(src.split_to(frame_len).freeze()))
}
