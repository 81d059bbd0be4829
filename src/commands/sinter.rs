use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::utils::sets;
use crate::Error;

/// Returns the members of the set resulting from the intersection of all the given sets. A
/// missing key makes the result empty.
///
/// Ref: <https://redis.io/docs/latest/commands/sinter/>
#[derive(Debug, PartialEq)]
pub struct Sinter {
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for Sinter {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let members = sets::intersection(ctx.db().sets.members_of(&self.keys).await?);

        Ok(Frame::Array(members.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Sinter {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining();

        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn intersection_of_sets() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SINTER")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("key2")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Sinter(Sinter {
                keys: vec![Bytes::from("key1"), Bytes::from("key2")],
            })
        );

        let sets = &dispatcher.keyspace().database(0).sets;
        sets.add(
            &Bytes::from("key1"),
            vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")],
        )
        .await
        .unwrap();
        sets.add(
            &Bytes::from("key2"),
            vec![Bytes::from("c"), Bytes::from("d"), Bytes::from("e")],
        )
        .await
        .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Array(vec![Frame::Bulk(Bytes::from("c"))]));

        let cmd = Command::Sinter(Sinter {
            keys: vec![Bytes::from("key1"), Bytes::from("missing")],
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Array(vec![]));
    }
}
