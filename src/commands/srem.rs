use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Remove the specified members from the set stored at key. Returns the number of members that
/// were removed.
///
/// Ref: <https://redis.io/docs/latest/commands/srem/>
#[derive(Debug, PartialEq)]
pub struct Srem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

#[async_trait]
impl Executable for Srem {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let removed = ctx.db().sets.remove(&self.key, &self.members).await?;

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Srem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining();

        Ok(Self { key, members })
    }
}
