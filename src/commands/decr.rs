use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Decrements the number stored at key by one. If the key does not exist, it is set to 0 before
/// performing the operation.
///
/// Ref: <https://redis.io/docs/latest/commands/decr/>
#[derive(Debug, PartialEq)]
pub struct Decr {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Decr {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx.db().strings.incr_by(&self.key, -1).await?;

        Ok(Frame::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for Decr {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
