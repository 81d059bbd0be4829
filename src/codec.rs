use bytes::{Buf, BytesMut};
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame};
use crate::Error;

/// Default upper bound of a single buffered request, matches `proto-max-bulk-len`.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Frames a byte stream into requests and replies. Requests may be multibulk arrays or inline
/// lines; both come out of the decoder as a `Frame::Array`.
#[derive(Debug)]
pub struct FrameCodec {
    max_frame_size: usize,
    bytes_read: u64,
    bytes_written: u64,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// Total bytes consumed by decoded frames.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Total bytes produced by encoded frames.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }

            // Check if the frame size exceeds a certain limit to prevent DoS attacks
            if src.len() > self.max_frame_size {
                return Err(frame::Error::from("frame size exceeds limit").into());
            }

            let mut cursor = Cursor::new(&src[..]);
            let parsed = if Frame::is_type_marker(src[0]) {
                Frame::parse(&mut cursor).map(Some)
            } else {
                Frame::parse_inline(&mut cursor)
            };

            let frame = match parsed {
                Ok(frame) => frame,
                Err(frame::Error::Incomplete) => return Ok(None), // Not enough data to parse a frame.
                Err(err) => return Err(err.into()),
            };

            let position = cursor.position() as usize;

            // Remove the parsed frame from the buffer.
            src.advance(position);
            self.bytes_read += position as u64;

            // Empty inline lines are skipped, keep going with whatever follows them.
            if let Some(frame) = frame {
                return Ok(Some(frame));
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = item.serialize();
        self.bytes_written += bytes.len() as u64;
        dst.extend_from_slice(&bytes);
        Ok(())
    }
}
