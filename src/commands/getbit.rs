use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::setbit::next_offset;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the bit value at offset in the string value stored at key. Offsets past the end of
/// the string, and missing keys, read as 0.
///
/// Ref: <https://redis.io/docs/latest/commands/getbit/>
#[derive(Debug, PartialEq)]
pub struct Getbit {
    pub key: Bytes,
    pub offset: u64,
}

#[async_trait]
impl Executable for Getbit {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let bit = ctx.db().strings.get_bit(&self.key, self.offset).await?;

        Ok(Frame::Integer(bit as i64))
    }
}

impl TryFrom<&mut CommandParser> for Getbit {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let offset = next_offset(parser)?;

        Ok(Self { key, offset })
    }
}
