use async_trait::async_trait;
use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Sets the specified fields to their respective values in the hash stored at key. Returns the
/// number of fields that were added.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hset {
    pub key: Bytes,
    pub pairs: Vec<(Bytes, Bytes)>,
}

#[async_trait]
impl Executable for Hset {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let added = ctx.db().hashes.set(&self.key, self.pairs).await?;

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let pairs = next_pairs(parser)?;

        Ok(Self { key, pairs })
    }
}

/// Reads the remaining arguments as field value pairs.
pub(crate) fn next_pairs(parser: &mut CommandParser) -> Result<Vec<(Bytes, Bytes)>, Error> {
    let args = parser.remaining();
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(parser.wrong_arity().into());
    }

    Ok(args.into_iter().tuples().collect())
}
