use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::utils::sets;
use crate::Error;

/// Returns the members of the set resulting from the difference between the first set and all
/// the successive sets.
///
/// Ref: <https://redis.io/docs/latest/commands/sdiff/>
#[derive(Debug, PartialEq)]
pub struct Sdiff {
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for Sdiff {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let members = sets::difference(ctx.db().sets.members_of(&self.keys).await?);

        Ok(Frame::Array(members.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Sdiff {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining();

        Ok(Self { keys })
    }
}
