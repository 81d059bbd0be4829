use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the remaining time to live of a key that has a timeout, in seconds.
///
/// * `-2` if the key does not exist.
/// * `-1` if the key exists but has no associated expire.
///
/// Ref: <https://redis.io/docs/latest/commands/ttl/>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Ttl {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let ttl = ctx.db().ttl(&self.key).await?;

        Ok(Frame::Integer(ttl.as_secs()))
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
