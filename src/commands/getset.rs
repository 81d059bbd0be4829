use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Atomically sets key to value and returns the old value stored at key. Any previous time to
/// live associated with the key is discarded.
///
/// Ref: <https://redis.io/docs/latest/commands/getset/>
#[derive(Debug, PartialEq)]
pub struct Getset {
    pub key: Bytes,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Getset {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let previous = ctx.db().strings.get_set(&self.key, self.value).await?;

        Ok(previous.map_or(Frame::Null, Frame::Bulk))
    }
}

impl TryFrom<&mut CommandParser> for Getset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}
