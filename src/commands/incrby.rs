use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Increments the number stored at key by increment. If the key does not exist, it is set to 0
/// before performing the operation.
///
/// Ref: <https://redis.io/docs/latest/commands/incrby/>
#[derive(Debug, PartialEq)]
pub struct IncrBy {
    pub key: Bytes,
    pub increment: i64,
}

#[async_trait]
impl Executable for IncrBy {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx.db().strings.incr_by(&self.key, self.increment).await?;

        Ok(Frame::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for IncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let increment = parser.next_integer()?;

        Ok(Self { key, increment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn existing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("INCRBY")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("5")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::IncrBy(IncrBy {
                key: Bytes::from("key1"),
                increment: 5,
            })
        );

        dispatcher
            .keyspace()
            .database(0)
            .strings
            .set(&Bytes::from("key1"), Bytes::from("10"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(15));
    }

    #[test]
    fn invalid_increment() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("INCRBY")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1.5")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR value is not an integer or out of range"
        );
    }
}
