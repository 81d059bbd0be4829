use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::expire::expire_at;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::utils::time::millis_from_now;
use crate::Error;

/// Works exactly like EXPIRE but the time to live of the key is specified in milliseconds.
///
/// Ref: <https://redis.io/docs/latest/commands/pexpire/>
#[derive(Debug, PartialEq)]
pub struct Pexpire {
    pub key: Bytes,
    pub millis: i64,
}

#[async_trait]
impl Executable for Pexpire {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let at = millis_from_now(self.millis).ok_or_else(|| {
            CommandParserError::InvalidExpireTime {
                command: "pexpire".to_string(),
            }
        })?;

        expire_at(ctx, &self.key, at).await
    }
}

impl TryFrom<&mut CommandParser> for Pexpire {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let millis = parser.next_integer()?;

        Ok(Self { key, millis })
    }
}
