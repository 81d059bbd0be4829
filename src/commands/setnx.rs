use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Set key to hold string value if key does not exist. In that case, it is equal to SET. When key
/// already holds a value, no operation is performed.
///
/// Ref: <https://redis.io/docs/latest/commands/setnx/>
#[derive(Debug, PartialEq)]
pub struct Setnx {
    pub key: Bytes,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Setnx {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let written = ctx
            .db()
            .strings
            .set_if_absent(&self.key, self.value, None)
            .await?;

        Ok(Frame::Integer(written as i64))
    }
}

impl TryFrom<&mut CommandParser> for Setnx {
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
    async fn only_the_first_write_wins() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SETNX")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Setnx(Setnx {
                key: Bytes::from("key1"),
                value: Bytes::from("1"),
            })
        );

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Integer(1));

        let cmd = Command::Setnx(Setnx {
            key: Bytes::from("key1"),
            value: Bytes::from("2"),
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Integer(0));

        let value = dispatcher
            .keyspace()
            .database(0)
            .strings
            .get(&Bytes::from("key1"))
            .await
            .unwrap();
        assert_eq!(value, Some(Bytes::from("1")));
    }
}
