use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns all values in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hvals/>
#[derive(Debug, PartialEq)]
pub struct Hvals {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Hvals {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let values = ctx.db().hashes.values(&self.key).await?;

        Ok(Frame::Array(values.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Hvals {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
