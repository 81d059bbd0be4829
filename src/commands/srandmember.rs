use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Returns random members of the set stored at key without removing them. A positive count
/// returns distinct members, a negative one allows the same member several times.
///
/// Ref: <https://redis.io/docs/latest/commands/srandmember/>
#[derive(Debug, PartialEq)]
pub struct Srandmember {
    pub key: Bytes,
    pub count: i64,
}

#[async_trait]
impl Executable for Srandmember {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let members = ctx
            .db()
            .sets
            .random_members(&self.key, self.count)
            .await?;

        Ok(Frame::Array(members.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Srandmember {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let count = parser.next_integer()?;
        if count < -(i64::MAX / 2) {
            return Err(CommandParserError::invalid("value is out of range").into());
        }

        Ok(Self { key, count })
    }
}
