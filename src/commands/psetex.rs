use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::utils::time::millis_from_now;
use crate::Error;

/// Works exactly like SETEX with the sole difference that the expire time is specified in
/// milliseconds instead of seconds.
///
/// Ref: <https://redis.io/docs/latest/commands/psetex/>
#[derive(Debug, PartialEq)]
pub struct Psetex {
    pub key: Bytes,
    pub millis: i64,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Psetex {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let expire_at =
            millis_from_now(self.millis).ok_or_else(|| CommandParserError::InvalidExpireTime {
                command: "psetex".to_string(),
            })?;

        ctx.db()
            .strings
            .set(&self.key, self.value, Some(expire_at))
            .await?;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Psetex {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let millis = parser.next_integer()?;
        let value = parser.next_bytes()?;

        if millis <= 0 {
            return Err(CommandParserError::InvalidExpireTime {
                command: "psetex".to_string(),
            }
            .into());
        }

        Ok(Self { key, millis, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::keyspace::KeyTtl;
    use crate::session::Session;

    #[tokio::test]
    async fn sets_value_and_ttl() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("PSETEX")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("5000")),
            Frame::Bulk(Bytes::from("hello")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Psetex(Psetex {
                key: Bytes::from("key1"),
                millis: 5000,
                value: Bytes::from("hello"),
            })
        );

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::ok());

        let ttl = dispatcher
            .keyspace()
            .database(0)
            .ttl(&Bytes::from("key1"))
            .await
            .unwrap();
        assert!(matches!(ttl, KeyTtl::ExpiresIn(millis) if millis <= 5000 && millis > 4000));
    }
}
