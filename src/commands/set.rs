use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::keyspace::{SetCondition, SetTtl};
use crate::utils::time::millis_from_now;
use crate::Error;

#[derive(Debug, PartialEq)]
pub enum Expiration {
    /// `EX seconds`
    Seconds(i64),
    /// `PX milliseconds`
    Millis(i64),
    KeepTtl,
}

/// Set key to hold the string value. If key already holds a value, it is overwritten. Any
/// previous time to live associated with the key is discarded on successful SET operation,
/// unless `KEEPTTL` is given.
///
/// Options: `EX seconds`, `PX milliseconds`, `NX` (only set if the key does not exist), `XX` (only
/// set if it already exists) and `KEEPTTL`.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    pub condition: SetCondition,
    pub expiration: Option<Expiration>,
}

#[async_trait]
impl Executable for Set {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let ttl = match self.expiration {
            None => SetTtl::Clear,
            Some(Expiration::KeepTtl) => SetTtl::Keep,
            Some(Expiration::Seconds(secs)) => SetTtl::At(deadline(secs.saturating_mul(1000))?),
            Some(Expiration::Millis(millis)) => SetTtl::At(deadline(millis)?),
        };

        let written = ctx
            .db()
            .strings
            .set_with(&self.key, self.value, self.condition, ttl)
            .await?;

        if written {
            Ok(Frame::ok())
        } else {
            Ok(Frame::Null)
        }
    }
}

fn deadline(millis: i64) -> Result<i64, CommandParserError> {
    millis_from_now(millis).ok_or_else(|| CommandParserError::InvalidExpireTime {
        command: "set".to_string(),
    })
}

/// Reads a strictly positive expiration amount, `unit` being its length in milliseconds.
fn next_expire(parser: &mut CommandParser, unit: i64) -> Result<i64, CommandParserError> {
    let amount = parser.next_integer()?;

    if amount <= 0 || amount.checked_mul(unit).is_none() {
        return Err(CommandParserError::InvalidExpireTime {
            command: parser.command().to_string(),
        });
    }

    Ok(amount)
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        let mut condition = SetCondition::Always;
        let mut expiration = None;

        while parser.has_next() {
            match parser.next_keyword()?.as_str() {
                "nx" if condition == SetCondition::Always => condition = SetCondition::IfAbsent,
                "xx" if condition == SetCondition::Always => condition = SetCondition::IfPresent,
                "ex" if expiration.is_none() => {
                    expiration = Some(Expiration::Seconds(next_expire(parser, 1000)?))
                }
                "px" if expiration.is_none() => {
                    expiration = Some(Expiration::Millis(next_expire(parser, 1)?))
                }
                "keepttl" if expiration.is_none() => expiration = Some(Expiration::KeepTtl),
                _ => return Err(CommandParserError::Syntax.into()),
            }
        }

        Ok(Self {
            key,
            value,
            condition,
            expiration,
        })
    }
}
