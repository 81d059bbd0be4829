use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Like TTL this command returns the remaining time to live of a key that has an expire set,
/// with the sole difference that TTL returns the amount of remaining time in seconds while PTTL
/// returns it in milliseconds.
///
/// Ref: <https://redis.io/docs/latest/commands/pttl/>
#[derive(Debug, PartialEq)]
pub struct Pttl {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Pttl {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let ttl = ctx.db().ttl(&self.key).await?;

        Ok(Frame::Integer(ttl.as_millis()))
    }
}

impl TryFrom<&mut CommandParser> for Pttl {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
