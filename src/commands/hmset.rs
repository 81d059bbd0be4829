use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::hset::next_pairs;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Sets the specified fields to their respective values in the hash stored at key. Same as HSET
/// but replies OK.
///
/// Ref: <https://redis.io/docs/latest/commands/hmset/>
#[derive(Debug, PartialEq)]
pub struct Hmset {
    pub key: Bytes,
    pub pairs: Vec<(Bytes, Bytes)>,
}

#[async_trait]
impl Executable for Hmset {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        ctx.db().hashes.set(&self.key, self.pairs).await?;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Hmset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let pairs = next_pairs(parser)?;

        Ok(Self { key, pairs })
    }
}
