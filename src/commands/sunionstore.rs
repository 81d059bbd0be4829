use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::utils::sets;
use crate::Error;

/// This command is equal to SUNION, but instead of returning the resulting set, it is stored in
/// destination. If destination already exists, it is overwritten.
///
/// Ref: <https://redis.io/docs/latest/commands/sunionstore/>
#[derive(Debug, PartialEq)]
pub struct SunionStore {
    pub destination: Bytes,
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for SunionStore {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let members = sets::union(ctx.db().sets.members_of(&self.keys).await?);

        store(ctx, &self.destination, members).await
    }
}

impl TryFrom<&mut CommandParser> for SunionStore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let destination = parser.next_bytes()?;
        let keys = parser.remaining();

        Ok(Self { destination, keys })
    }
}

/// Replaces `destination`, whatever its type, with a set of `members`. Replies the size of the
/// stored set. The delete and the writes are separate backend calls.
pub(crate) async fn store(
    ctx: &Context<'_>,
    destination: &Bytes,
    members: Vec<Bytes>,
) -> Result<Frame, Error> {
    let db = ctx.db();
    db.delete(std::slice::from_ref(destination)).await?;

    let stored = if members.is_empty() {
        0
    } else {
        db.sets.add(destination, members).await?
    };

    Ok(Frame::Integer(stored as i64))
}
