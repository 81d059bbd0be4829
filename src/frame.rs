// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

/// Redis rejects multibulk requests announcing more elements than this.
const MAX_MULTIBULK_LEN: i64 = 1024 * 1024;

/// Inline requests are meant for humans typing into a terminal, a long line is a broken client.
pub const MAX_INLINE_LEN: usize = 64 * 1024;

/// Largest bulk string we accept, mirrors `proto-max-bulk-len`.
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("Protocol error: invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("Protocol error: invalid {0} length")]
    InvalidLength(&'static str),
    #[error("Protocol error: expected '\\r\\n' after bulk data")]
    MissingTerminator,
    #[error("Protocol error: too big inline request")]
    InlineTooLong,
    /// Invalid message encoding.
    #[error("Protocol error: {0}")]
    Other(crate::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    /// Returns true when `byte` opens a typed RESP frame. Anything else starts an inline request.
    pub fn is_type_marker(byte: u8) -> bool {
        DataType::try_from(byte).is_ok()
    }

    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let integer = get_decimal(src, "integer")?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = get_decimal(src, "bulk")?;

                if length == -1 {
                    return Ok(Frame::Null);
                }
                if !(0..=MAX_BULK_LEN).contains(&length) {
                    return Err(Error::InvalidLength("bulk"));
                }

                let data = get_exact(src, length as usize)?;
                Ok(Frame::Bulk(Bytes::copy_from_slice(data)))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = get_decimal(src, "multibulk")?;

                if length == -1 {
                    return Ok(Frame::Null);
                }
                if !(0..=MAX_MULTIBULK_LEN).contains(&length) {
                    return Err(Error::InvalidLength("multibulk"));
                }

                let mut frames = Vec::with_capacity(length as usize);
                for _ in 0..length {
                    let frame = Self::parse(src)?;
                    frames.push(frame);
                }

                Ok(Frame::Array(frames))
            }
            DataType::Null => {
                // Advance the cursor to the end of the frame.
                let _ = get_line(src)?;

                Ok(Frame::Null)
            }
        }
    }

    /// Parses an inline request, a single line of whitespace separated arguments. Returns
    /// `Ok(None)` for an empty line, which clients may send as a keep-alive.
    pub fn parse_inline(src: &mut Cursor<&[u8]>) -> Result<Option<Self>, Error> {
        let start = src.position() as usize;
        let buf: &[u8] = *src.get_ref();

        let newline = match buf[start..].iter().position(|b| *b == b'\n') {
            Some(index) => start + index,
            None if buf.len() - start > MAX_INLINE_LEN => return Err(Error::InlineTooLong),
            None => return Err(Error::Incomplete),
        };

        src.set_position((newline + 1) as u64);

        let mut line = &buf[start..newline];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }

        let args: Vec<Frame> = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| Frame::Bulk(Bytes::copy_from_slice(part)))
            .collect();

        if args.is_empty() {
            return Ok(None);
        }

        Ok(Some(Frame::Array(args)))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }

    pub fn write_to(&self, bytes: &mut Vec<u8>) {
        match self {
            Frame::Simple(s) => {
                bytes.push(u8::from(DataType::SimpleString));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
            }
            Frame::Error(s) => {
                bytes.push(u8::from(DataType::SimpleError));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
            }
            Frame::Integer(i) => {
                bytes.push(u8::from(DataType::Integer));
                bytes.extend_from_slice(i.to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
            }
            Frame::Bulk(data) => {
                bytes.push(u8::from(DataType::BulkString));
                bytes.extend_from_slice(data.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes.extend_from_slice(data);
                bytes.extend_from_slice(CRLF);
            }
            // RESP2 null bulk string, RESP3 `_` is never sent.
            Frame::Null => bytes.extend_from_slice(b"$-1\r\n"),
            Frame::Array(arr) => {
                bytes.push(u8::from(DataType::Array));
                bytes.extend_from_slice(arr.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in arr {
                    frame.write_to(bytes);
                }
            }
        }
    }

    /// Shorthand for the `+OK` reply.
    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    /// An array of bulk strings, where missing values are sent as null bulk strings.
    pub fn bulk_array<I>(values: I) -> Frame
    where
        I: IntoIterator<Item = Option<Bytes>>,
    {
        Frame::Array(
            values
                .into_iter()
                .map(|value| value.map_or(Frame::Null, Frame::Bulk))
                .collect(),
        )
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
        }
    }
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    let line_end = buf[start..]
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)
        .map(|index| start + index)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&buf[start..line_end])
}

fn get_decimal(src: &mut Cursor<&[u8]>, what: &'static str) -> Result<i64, Error> {
    let line = get_line(src)?;
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(Error::InvalidLength(what))
}

fn get_exact<'a>(src: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    if buf.len() < start + len + CRLF.len() {
        return Err(Error::Incomplete);
    }
    if &buf[start + len..start + len + CRLF.len()] != CRLF {
        return Err(Error::MissingTerminator);
    }

    src.set_position((start + len + CRLF.len()) as u64);

    Ok(&buf[start..start + len])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    BulkString,   // '$'
    SimpleError,  // '-'
    Integer,      // ':'
    Array,        // '*'
    // Only parsed, replies use the RESP2 null bulk string.
    Null, // '_'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            b'_' => Ok(Self::Null),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
            DataType::Null => b'_',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        "invalid frame format".into()
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::Other(src.into())
    }
}
