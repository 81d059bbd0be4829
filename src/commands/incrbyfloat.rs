use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Increment the string representing a floating point number stored at key by the specified
/// increment. If the key does not exist, it is set to 0 before performing the operation.
///
/// The reply is the new value as a bulk string, without trailing zeros.
///
/// Ref: <https://redis.io/docs/latest/commands/incrbyfloat/>
#[derive(Debug, PartialEq)]
pub struct IncrByFloat {
    pub key: Bytes,
    pub increment: f64,
}

#[async_trait]
impl Executable for IncrByFloat {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx
            .db()
            .strings
            .incr_by_float(&self.key, self.increment)
            .await?;

        Ok(Frame::Bulk(Bytes::from(value)))
    }
}

impl TryFrom<&mut CommandParser> for IncrByFloat {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let increment = parser.next_float()?;

        Ok(Self { key, increment })
    }
}
