use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Get the value of key. If the key does not exist the special value nil is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Get {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx.db().strings.get(&self.key).await?;

        Ok(value.map_or(Frame::Null, Frame::Bulk))
    }
}

impl TryFrom<&mut CommandParser> for Get {
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
    use crate::session::Session;

    #[tokio::test]
    async fn existing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: Bytes::from("key1")
            })
        );

        dispatcher
            .keyspace()
            .database(0)
            .strings
            .set(&Bytes::from("key1"), Bytes::from("1"), None)
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Bulk(Bytes::from("1")));
    }

    #[tokio::test]
    async fn non_existing_key() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Null);
    }
}
