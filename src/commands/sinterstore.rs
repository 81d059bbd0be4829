use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::sunionstore::store;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::utils::sets;
use crate::Error;

/// This command is equal to SINTER, but instead of returning the resulting set, it is stored in
/// destination. If destination already exists, it is overwritten.
///
/// Ref: <https://redis.io/docs/latest/commands/sinterstore/>
#[derive(Debug, PartialEq)]
pub struct SinterStore {
    pub destination: Bytes,
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for SinterStore {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let members = sets::intersection(ctx.db().sets.members_of(&self.keys).await?);

        store(ctx, &self.destination, members).await
    }
}

impl TryFrom<&mut CommandParser> for SinterStore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let destination = parser.next_bytes()?;
        let keys = parser.remaining();

        Ok(Self { destination, keys })
    }
}
