use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Increment the specified field of a hash stored at key, and representing a floating point
/// number, by the specified increment.
///
/// Ref: <https://redis.io/docs/latest/commands/hincrbyfloat/>
#[derive(Debug, PartialEq)]
pub struct HincrByFloat {
    pub key: Bytes,
    pub field: Bytes,
    pub increment: f64,
}

#[async_trait]
impl Executable for HincrByFloat {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx
            .db()
            .hashes
            .incr_by_float(&self.key, &self.field, self.increment)
            .await?;

        Ok(Frame::Bulk(Bytes::from(value)))
    }
}

impl TryFrom<&mut CommandParser> for HincrByFloat {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        let increment = parser.next_float()?;

        Ok(Self {
            key,
            field,
            increment,
        })
    }
}
