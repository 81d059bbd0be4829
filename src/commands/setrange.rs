use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Overwrites part of the string stored at key, starting at the specified offset, for the
/// entire length of value. If the offset is larger than the current length of the string at
/// key, the string is padded with zero-bytes to make offset fit. A negative offset counts from
/// the end of the current string.
///
/// Ref: <https://redis.io/docs/latest/commands/setrange/>
#[derive(Debug, PartialEq)]
pub struct Setrange {
    pub key: Bytes,
    pub offset: i64,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Setrange {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let len = ctx
            .db()
            .strings
            .set_range(&self.key, self.offset, self.value)
            .await?;

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Setrange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let offset = parser.next_integer()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, offset, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn overwrite_existing_value() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SETRANGE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("6")),
            Frame::Bulk(Bytes::from("Redis")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Setrange(Setrange {
                key: Bytes::from("key1"),
                offset: 6,
                value: Bytes::from("Redis"),
            })
        );

        let strings = &dispatcher.keyspace().database(0).strings;
        strings
            .set(&Bytes::from("key1"), Bytes::from("Hello World"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(11));
        assert_eq!(
            strings.get(&Bytes::from("key1")).await.unwrap(),
            Some(Bytes::from("Hello Redis"))
        );
    }

    #[tokio::test]
    async fn pads_missing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let cmd = Command::Setrange(Setrange {
            key: Bytes::from("key2"),
            offset: 6,
            value: Bytes::from("Redis"),
        });

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(11));
        assert_eq!(
            dispatcher
                .keyspace()
                .database(0)
                .strings
                .get(&Bytes::from("key2"))
                .await
                .unwrap(),
            Some(Bytes::from("\0\0\0\0\0\0Redis"))
        );
    }

    #[tokio::test]
    async fn negative_offset() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SETRANGE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("-5")),
            Frame::Bulk(Bytes::from("Redis")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Setrange(Setrange {
                key: Bytes::from("key1"),
                offset: -5,
                value: Bytes::from("Redis"),
            })
        );

        dispatcher
            .keyspace()
            .database(0)
            .strings
            .set(&Bytes::from("key1"), Bytes::from("Hello World"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Integer(11));

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GETRANGE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("-5")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Bulk(Bytes::from("Redis")));
    }

    #[tokio::test]
    async fn offset_before_the_start() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let cmd = Command::Setrange(Setrange {
            key: Bytes::from("key1"),
            offset: -1,
            value: Bytes::from("Redis"),
        });

        let err = dispatcher.execute(cmd, &mut session).await.unwrap_err();

        assert_eq!(err.to_string(), "ERR offset is out of range");
    }
}
