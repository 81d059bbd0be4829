use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::expire::expire_at;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// EXPIREAT has the same effect and semantic as EXPIRE, but instead of specifying the number of
/// seconds representing the TTL, it takes an absolute Unix timestamp in seconds. A timestamp in
/// the past deletes the key.
///
/// Ref: <https://redis.io/docs/latest/commands/expireat/>
#[derive(Debug, PartialEq)]
pub struct ExpireAt {
    pub key: Bytes,
    pub timestamp: i64,
}

#[async_trait]
impl Executable for ExpireAt {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let at = self.timestamp.checked_mul(1000).ok_or_else(|| {
            CommandParserError::InvalidExpireTime {
                command: "expireat".to_string(),
            }
        })?;

        expire_at(ctx, &self.key, at).await
    }
}

impl TryFrom<&mut CommandParser> for ExpireAt {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let timestamp = parser.next_integer()?;

        Ok(Self { key, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;
    use crate::utils::time::now_millis;

    #[tokio::test]
    async fn future_timestamp() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();
        let timestamp = now_millis() / 1000 + 100;

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXPIREAT")),
            Frame::Bulk(Bytes::from("mykey")),
            Frame::Bulk(Bytes::from(timestamp.to_string())),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::ExpireAt(ExpireAt {
                key: Bytes::from("mykey"),
                timestamp,
            })
        );

        let db = dispatcher.keyspace().database(0);
        db.strings
            .set(&Bytes::from("mykey"), Bytes::from("Hello"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(1));
        let ttl = db.ttl(&Bytes::from("mykey")).await.unwrap().as_secs();
        assert!((99..=100).contains(&ttl));
    }

    #[test]
    fn invalid_timestamp() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXPIREAT")),
            Frame::Bulk(Bytes::from("mykey")),
            Frame::Bulk(Bytes::from("not-a-number")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR value is not an integer or out of range"
        );
    }
}
