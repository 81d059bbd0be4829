use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Remove the existing timeout on key, turning the key from volatile to persistent.
///
/// Ref: <https://redis.io/docs/latest/commands/persist/>
#[derive(Debug, PartialEq)]
pub struct Persist {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Persist {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let cleared = ctx.db().persist(&self.key).await?;

        Ok(Frame::Integer(cleared as i64))
    }
}

impl TryFrom<&mut CommandParser> for Persist {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}
