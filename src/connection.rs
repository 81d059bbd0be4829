use futures::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::codec::{FrameCodec, DEFAULT_MAX_FRAME_SIZE};
use crate::frame::Frame;
use crate::Error;

/// A client connection, split into a framed reader and a framed writer so a monitor can wait on
/// both directions at once.
pub struct Connection {
    // Data is read from the socket into the decoder's buffer. When a frame is parsed, the
    // corresponding data is removed from the buffer.
    reader: FramedRead<OwnedReadHalf, FrameCodec>,
    writer: FramedWrite<OwnedWriteHalf, FrameCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Self::with_max_frame_size(stream, DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(stream: TcpStream, max_frame_size: usize) -> Connection {
        let (read_half, write_half) = stream.into_split();

        Connection {
            reader: FramedRead::new(read_half, FrameCodec::new(max_frame_size)),
            writer: FramedWrite::new(write_half, FrameCodec::new(max_frame_size)),
        }
    }

    /// Reads the next frame. `Ok(None)` means the peer closed the connection cleanly.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.reader.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.writer.send(frame).await
    }

    pub fn bytes_read(&self) -> u64 {
        self.reader.decoder().bytes_read()
    }

    pub fn bytes_written(&self) -> u64 {
        self.writer.encoder().bytes_written()
    }
}
