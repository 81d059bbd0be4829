use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns all field names in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hkeys/>
#[derive(Debug, PartialEq)]
pub struct Hkeys {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Hkeys {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let fields = ctx.db().hashes.keys(&self.key).await?;

        Ok(Frame::Array(fields.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Hkeys {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
