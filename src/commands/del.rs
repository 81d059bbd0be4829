use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Removes the specified keys. A key is ignored if it does not exist. A key present in several
/// families counts once per family.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for Del {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let count = ctx.db().delete(&self.keys).await?;

        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining();

        Ok(Self { keys })
    }
}
