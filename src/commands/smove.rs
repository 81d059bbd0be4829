use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Move member from the set at source to the set at destination.
///
/// Ref: <https://redis.io/docs/latest/commands/smove/>
#[derive(Debug, PartialEq)]
pub struct Smove {
    pub source: Bytes,
    pub destination: Bytes,
    pub member: Bytes,
}

#[async_trait]
impl Executable for Smove {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let moved = ctx
            .db()
            .sets
            .move_member(&self.source, &self.destination, &self.member)
            .await?;

        Ok(Frame::Integer(moved as i64))
    }
}

impl TryFrom<&mut CommandParser> for Smove {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let source = parser.next_bytes()?;
        let destination = parser.next_bytes()?;
        let member = parser.next_bytes()?;

        Ok(Self {
            source,
            destination,
            member,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn moves_member() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SMOVE")),
            Frame::Bulk(Bytes::from("myset")),
            Frame::Bulk(Bytes::from("myotherset")),
            Frame::Bulk(Bytes::from("two")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Smove(Smove {
                source: Bytes::from("myset"),
                destination: Bytes::from("myotherset"),
                member: Bytes::from("two"),
            })
        );

        let sets = &dispatcher.keyspace().database(0).sets;
        sets.add(
            &Bytes::from("myset"),
            vec![Bytes::from("one"), Bytes::from("two")],
        )
        .await
        .unwrap();
        sets.add(&Bytes::from("myotherset"), vec![Bytes::from("three")])
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(1));
        assert_eq!(
            sets.members(&Bytes::from("myset")).await.unwrap(),
            vec![Bytes::from("one")]
        );
        assert_eq!(
            sets.members(&Bytes::from("myotherset")).await.unwrap(),
            vec![Bytes::from("three"), Bytes::from("two")]
        );

        let cmd = Command::Smove(Smove {
            source: Bytes::from("myset"),
            destination: Bytes::from("myotherset"),
            member: Bytes::from("two"),
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Integer(0));
    }
}
