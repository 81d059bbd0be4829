use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Decrements the number stored at key by decrement. If the key does not exist, it is set to 0
/// before performing the operation.
///
/// Ref: <https://redis.io/docs/latest/commands/decrby/>
#[derive(Debug, PartialEq)]
pub struct DecrBy {
    pub key: Bytes,
    pub decrement: i64,
}

#[async_trait]
impl Executable for DecrBy {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx.db().strings.incr_by(&self.key, -self.decrement).await?;

        Ok(Frame::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for DecrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let decrement = parser.next_integer()?;

        // Negating it would not fit.
        if decrement == i64::MIN {
            return Err(CommandParserError::invalid("decrement would overflow").into());
        }

        Ok(Self { key, decrement })
    }
}
