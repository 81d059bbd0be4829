use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::utils::time::millis_from_now;
use crate::Error;

/// Set a timeout on key. After the timeout has expired, the key will automatically be deleted.
/// A non-positive timeout deletes the key right away.
///
/// Ref: <https://redis.io/docs/latest/commands/expire/>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: Bytes,
    pub seconds: i64,
}

#[async_trait]
impl Executable for Expire {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let at = self
            .seconds
            .checked_mul(1000)
            .and_then(millis_from_now)
            .ok_or_else(|| CommandParserError::InvalidExpireTime {
                command: "expire".to_string(),
            })?;

        expire_at(ctx, &self.key, at).await
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let seconds = parser.next_integer()?;

        Ok(Self { key, seconds })
    }
}

/// Shared by the expire family. `at` is unix time in milliseconds; replies 1 when the key was
/// found.
pub(crate) async fn expire_at(ctx: &Context<'_>, key: &Bytes, at: i64) -> Result<Frame, Error> {
    let updated = ctx.db().expire_at(key, at).await?;

    Ok(Frame::Integer(updated as i64))
}
