use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::utils::bits::MAX_BIT_OFFSET;
use crate::Error;

/// Sets or clears the bit at offset in the string value stored at key. The string is grown to
/// make sure it can hold a bit at offset.
///
/// Ref: <https://redis.io/docs/latest/commands/setbit/>
#[derive(Debug, PartialEq)]
pub struct Setbit {
    pub key: Bytes,
    pub offset: u64,
    pub bit: bool,
}

#[async_trait]
impl Executable for Setbit {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let previous = ctx
            .db()
            .strings
            .set_bit(&self.key, self.offset, self.bit)
            .await?;

        Ok(Frame::Integer(previous as i64))
    }
}

impl TryFrom<&mut CommandParser> for Setbit {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let offset = next_offset(parser)?;

        let bit = match parser.next_bytes()?.as_ref() {
            b"0" => false,
            b"1" => true,
            _ => return Err(CommandParserError::BitValue.into()),
        };

        Ok(Self { key, offset, bit })
    }
}

/// Reads a bit offset, rejecting anything outside a 512 MiB string.
pub(crate) fn next_offset(parser: &mut CommandParser) -> Result<u64, CommandParserError> {
    let offset = parser
        .next_integer()
        .map_err(|_| CommandParserError::BitOffset)?;

    u64::try_from(offset)
        .ok()
        .filter(|offset| *offset <= MAX_BIT_OFFSET)
        .ok_or(CommandParserError::BitOffset)
}
