use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the values associated with the specified fields in the hash stored at key, nil for
/// every field that does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/hmget/>
#[derive(Debug, PartialEq)]
pub struct Hmget {
    pub key: Bytes,
    pub fields: Vec<Bytes>,
}

#[async_trait]
impl Executable for Hmget {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let values = ctx.db().hashes.mget(&self.key, &self.fields).await?;

        Ok(Frame::bulk_array(values))
    }
}

impl TryFrom<&mut CommandParser> for Hmget {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let fields = parser.remaining();

        Ok(Self { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn keeps_field_order() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HMGET")),
            Frame::Bulk(Bytes::from("myhash")),
            Frame::Bulk(Bytes::from("field2")),
            Frame::Bulk(Bytes::from("nofield")),
            Frame::Bulk(Bytes::from("field1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Hmget(Hmget {
                key: Bytes::from("myhash"),
                fields: vec![
                    Bytes::from("field2"),
                    Bytes::from("nofield"),
                    Bytes::from("field1")
                ],
            })
        );

        dispatcher
            .keyspace()
            .database(0)
            .hashes
            .set(
                &Bytes::from("myhash"),
                vec![
                    (Bytes::from("field1"), Bytes::from("Hello")),
                    (Bytes::from("field2"), Bytes::from("World")),
                ],
            )
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(
            res,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("World")),
                Frame::Null,
                Frame::Bulk(Bytes::from("Hello")),
            ])
        );
    }
}
