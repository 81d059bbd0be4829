use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the number of fields contained in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hlen/>
#[derive(Debug, PartialEq)]
pub struct Hlen {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Hlen {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let len = ctx.db().hashes.len(&self.key).await?;

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hlen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
