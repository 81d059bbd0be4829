use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Removes and returns one or more random members from the set value store at key.
///
/// Without a count the reply is a single member, or nil when the set is empty. With a count it
/// is an array of up to count distinct members.
///
/// Ref: <https://redis.io/docs/latest/commands/spop/>
#[derive(Debug, PartialEq)]
pub struct Spop {
    pub key: Bytes,
    pub count: Option<usize>,
}

#[async_trait]
impl Executable for Spop {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let sets = &ctx.db().sets;

        match self.count {
            Some(count) => {
                let members = sets.pop(&self.key, count).await?;
                Ok(Frame::Array(members.into_iter().map(Frame::Bulk).collect()))
            }
            None => {
                let member = sets.pop(&self.key, 1).await?.into_iter().next();
                Ok(member.map_or(Frame::Null, Frame::Bulk))
            }
        }
    }
}

impl TryFrom<&mut CommandParser> for Spop {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        let count = if parser.has_next() {
            let count = usize::try_from(parser.next_integer()?).map_err(|_| {
                CommandParserError::invalid("value is out of range, must be positive")
            })?;
            Some(count)
        } else {
            None
        };

        parser.finish()?;

        Ok(Self { key, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn pops_single_member() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SPOP")),
            Frame::Bulk(Bytes::from("myset")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Spop(Spop {
                key: Bytes::from("myset"),
                count: None,
            })
        );

        let sets = &dispatcher.keyspace().database(0).sets;
        sets.add(&Bytes::from("myset"), vec![Bytes::from("one")])
            .await
            .unwrap();

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Bulk(Bytes::from("one")));
        assert_eq!(sets.card(&Bytes::from("myset")).await.unwrap(), 0);

        let cmd = Command::Spop(Spop {
            key: Bytes::from("myset"),
            count: None,
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Null);
    }

    #[tokio::test]
    async fn pops_distinct_members() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let sets = &dispatcher.keyspace().database(0).sets;
        sets.add(
            &Bytes::from("myset"),
            ["a", "b", "c", "d", "e"].into_iter().map(Bytes::from).collect(),
        )
        .await
        .unwrap();

        let cmd = Command::Spop(Spop {
            key: Bytes::from("myset"),
            count: Some(3),
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        let Frame::Array(popped) = res else {
            panic!("expected an array reply, got {:?}", res);
        };
        assert_eq!(popped.len(), 3);
        assert_eq!(sets.card(&Bytes::from("myset")).await.unwrap(), 2);
        for frame in popped {
            let Frame::Bulk(member) = frame else {
                panic!("expected a bulk member");
            };
            assert!(!sets.is_member(&Bytes::from("myset"), &member).await.unwrap());
        }
    }

    #[test]
    fn negative_count() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SPOP")),
            Frame::Bulk(Bytes::from("myset")),
            Frame::Bulk(Bytes::from("-1")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR value is out of range, must be positive"
        );
    }
}
