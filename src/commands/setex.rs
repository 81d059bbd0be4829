use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::utils::time::millis_from_now;
use crate::Error;

/// Set key to hold the string value and set key to timeout after a given number of seconds.
///
/// Ref: <https://redis.io/docs/latest/commands/setex/>
#[derive(Debug, PartialEq)]
pub struct Setex {
    pub key: Bytes,
    pub seconds: i64,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Setex {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let expire_at = self
            .seconds
            .checked_mul(1000)
            .and_then(millis_from_now)
            .ok_or_else(|| CommandParserError::InvalidExpireTime {
                command: "setex".to_string(),
            })?;

        ctx.db()
            .strings
            .set(&self.key, self.value, Some(expire_at))
            .await?;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Setex {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let seconds = parser.next_integer()?;
        let value = parser.next_bytes()?;

        if seconds <= 0 {
            return Err(CommandParserError::InvalidExpireTime {
                command: "setex".to_string(),
            }
            .into());
        }

        Ok(Self {
            key,
            seconds,
            value,
        })
    }
}
