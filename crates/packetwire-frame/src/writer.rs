use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{FrameCodec, FrameConfig};
use crate::delimited::encode_delimited;
use crate::error::{FrameError, Result};
use crate::packet::Packet;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes length-delimited frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write one complete frame and flush (blocking).
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_delimited(frame, self.config.max_frame_size, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Encode `packet` through `codec` and write the frame.
    pub fn write_packet(&mut self, codec: &FrameCodec, packet: &dyn Packet) -> Result<()> {
        let frame = codec.encode(packet)?;
        self.write_frame(&frame)
    }

    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::delimited::decode_delimited;
    use crate::fixtures::{chat_codec, Chat, Ping};

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> BytesMut {
        BytesMut::from(writer.into_inner().into_inner().as_slice())
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_frame(b"\x00one").unwrap();
        writer.write_frame(b"\x01").unwrap();

        let mut wire = written(writer);
        let first = decode_delimited(&mut wire, usize::MAX).unwrap().unwrap();
        let second = decode_delimited(&mut wire, usize::MAX).unwrap().unwrap();
        assert_eq!(first.as_ref(), b"\x00one");
        assert_eq!(second.as_ref(), b"\x01");
        assert!(wire.is_empty());
    }

    #[test]
    fn write_packet_prefixes_the_frame() {
        let codec = chat_codec();
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_packet(&codec, &Chat::new("hi")).unwrap();
        writer.write_packet(&codec, &Ping::default()).unwrap();

        let wire = written(writer);
        assert_eq!(
            wire.as_ref(),
            &[0, 0, 0, 7, 0x00, 0, 0, 0, 2, b'h', b'i', 0, 0, 0, 1, 0x01]
        );
    }

    #[test]
    fn frame_too_large_rejected() {
        let cfg = FrameConfig { max_frame_size: 4 };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        let err = writer.write_frame(b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 9, max: 4 }));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.write_frame(b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn retries_interrupted_and_would_block() {
        for kind in [ErrorKind::Interrupted, ErrorKind::WouldBlock] {
            let mut writer = FrameWriter::new(FlakyWriter {
                write_error: Some(kind),
                flush_error: Some(kind),
                data: Vec::new(),
            });
            writer.write_frame(b"\x05retry").unwrap();
            assert_eq!(writer.get_ref().data.len(), 4 + 6);
        }
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.write_frame(b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FlakyWriter {
        write_error: Option<ErrorKind>,
        flush_error: Option<ErrorKind>,
        data: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.write_error.take() {
                return Err(std::io::Error::from(kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            match self.flush_error.take() {
                Some(kind) => Err(std::io::Error::from(kind)),
                None => Ok(()),
            }
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
