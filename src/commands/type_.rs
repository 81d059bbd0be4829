use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the string representation of the type of the value stored at `key`.
///
/// The types that can be returned are: `string`, `hash`, `list`, `zset` and `set`. If the key
/// does not exist, `none` is returned. When the same key exists in more than one family the
/// first one wins, in that order.
///
/// Ref: <https://redis.io/docs/latest/commands/type/>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Type {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let key_type = ctx.db().key_type(&self.key).await?;

        Ok(Frame::Simple(key_type.to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Type {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
