use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the length of the string value stored at key, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/strlen/>
#[derive(Debug, PartialEq)]
pub struct Strlen {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Strlen {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let len = ctx.db().strings.strlen(&self.key).await?;

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Strlen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
