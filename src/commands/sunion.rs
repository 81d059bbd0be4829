use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::utils::sets;
use crate::Error;

/// Returns the members of the set resulting from the union of all the given sets. Missing keys
/// are considered to be empty sets.
///
/// Ref: <https://redis.io/docs/latest/commands/sunion/>
#[derive(Debug, PartialEq)]
pub struct Sunion {
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for Sunion {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let members = sets::union(ctx.db().sets.members_of(&self.keys).await?);

        Ok(Frame::Array(members.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Sunion {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining();

        Ok(Self { keys })
    }
}
