use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Add the specified members to the set stored at key. Specified members that are already a
/// member of this set are ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct Sadd {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

#[async_trait]
impl Executable for Sadd {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let added = ctx.db().sets.add(&self.key, self.members).await?;

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sadd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining();

        Ok(Self { key, members })
    }
}
