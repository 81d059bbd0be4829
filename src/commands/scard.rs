use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the set cardinality (number of elements) of the set stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/scard/>
#[derive(Debug, PartialEq)]
pub struct Scard {
    pub key: Bytes,
}

#[async_trait]
impl Executable for Scard {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let card = ctx.db().sets.card(&self.key).await?;

        Ok(Frame::Integer(card as i64))
    }
}

impl TryFrom<&mut CommandParser> for Scard {
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
    async fn counts_members() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SCARD")),
            Frame::Bulk(Bytes::from("myset")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Scard(Scard {
                key: Bytes::from("myset")
            })
        );

        dispatcher
            .keyspace()
            .database(0)
            .sets
            .add(
                &Bytes::from("myset"),
                vec![Bytes::from("Hello"), Bytes::from("World")],
            )
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(2));
    }
}
