use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Increments the number stored at key by one. If the key does not exist, it is set to 0 before
/// performing the operation.
///
/// Ref: <https://redis.io/docs/latest/commands/incr/>
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Incr {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx.db().strings.incr_by(&self.key, 1).await?;

        Ok(Frame::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for Incr {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::keyspace::StoreError;
    use crate::session::Session;

    #[tokio::test]
    async fn existing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("INCR")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Incr(Incr {
                key: Bytes::from("key1")
            })
        );

        let strings = &dispatcher.keyspace().database(0).strings;
        strings
            .set(&Bytes::from("key1"), Bytes::from("10"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(11));
        assert_eq!(
            strings.get(&Bytes::from("key1")).await.unwrap(),
            Some(Bytes::from("11"))
        );
    }

    #[tokio::test]
    async fn non_existing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let cmd = Command::Incr(Incr {
            key: Bytes::from("key1"),
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(1));
    }

    #[tokio::test]
    async fn not_an_integer() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        dispatcher
            .keyspace()
            .database(0)
            .strings
            .set(&Bytes::from("key1"), Bytes::from("value"), None)
            .await
            .unwrap();

        let cmd = Command::Incr(Incr {
            key: Bytes::from("key1"),
        });
        let err = dispatcher.execute(cmd, &mut session).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::NotAnInteger)
        );
    }

    #[tokio::test]
    async fn overflow() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        dispatcher
            .keyspace()
            .database(0)
            .strings
            .set(&Bytes::from("key1"), Bytes::from(i64::MAX.to_string()), None)
            .await
            .unwrap();

        let cmd = Command::Incr(Incr {
            key: Bytes::from("key1"),
        });
        let err = dispatcher.execute(cmd, &mut session).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR increment or decrement would overflow"
        );
    }
}
