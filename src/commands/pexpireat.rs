use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::expire::expire_at;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// PEXPIREAT has the same effect and semantic as EXPIREAT, but the Unix time at which the key
/// will expire is specified in milliseconds instead of seconds.
///
/// Ref: <https://redis.io/docs/latest/commands/pexpireat/>
#[derive(Debug, PartialEq)]
pub struct PexpireAt {
    pub key: Bytes,
    pub timestamp: i64,
}

#[async_trait]
impl Executable for PexpireAt {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        expire_at(ctx, &self.key, self.timestamp).await
    }
}

impl TryFrom<&mut CommandParser> for PexpireAt {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let timestamp = parser.next_integer()?;

        Ok(Self { key, timestamp })
    }
}
