use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// If key already exists and is a string, this command appends the value at the end of the
/// string. If key does not exist it is created and set as an empty string, so APPEND will be
/// similar to SET in this special case.
///
/// Ref: <https://redis.io/docs/latest/commands/append/>
#[derive(Debug, PartialEq)]
pub struct Append {
    pub key: Bytes,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Append {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let len = ctx.db().strings.append(&self.key, self.value).await?;

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Append {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
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
            Frame::Bulk(Bytes::from("APPEND")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from(" World")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Append(Append {
                key: Bytes::from("key1"),
                value: Bytes::from(" World"),
            })
        );

        let strings = &dispatcher.keyspace().database(0).strings;
        strings
            .set(&Bytes::from("key1"), Bytes::from("Hello"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(11));
        assert_eq!(
            strings.get(&Bytes::from("key1")).await.unwrap(),
            Some(Bytes::from("Hello World"))
        );
    }

    #[tokio::test]
    async fn non_existing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let cmd = Command::Append(Append {
            key: Bytes::from("key1"),
            value: Bytes::from("Hello"),
        });

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(5));
    }
}
