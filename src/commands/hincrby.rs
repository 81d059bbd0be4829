use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Increments the number stored at field in the hash stored at key by increment. A missing
/// field is set to 0 before the operation is performed.
///
/// Ref: <https://redis.io/docs/latest/commands/hincrby/>
#[derive(Debug, PartialEq)]
pub struct HincrBy {
    pub key: Bytes,
    pub field: Bytes,
    pub increment: i64,
}

#[async_trait]
impl Executable for HincrBy {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx
            .db()
            .hashes
            .incr_by(&self.key, &self.field, self.increment)
            .await?;

        Ok(Frame::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for HincrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        let increment = parser.next_integer()?;

        Ok(Self {
            key,
            field,
            increment,
        })
    }
}
