use async_trait::async_trait;
use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Sets the given keys to their respective values. MSET replaces existing values with new
/// values, just as regular SET.
///
/// Each key is an independent write, a failure part way leaves the earlier ones applied.
///
/// Ref: <https://redis.io/docs/latest/commands/mset/>
#[derive(Debug, PartialEq)]
pub struct Mset {
    pub pairs: Vec<(Bytes, Bytes)>,
}

#[async_trait]
impl Executable for Mset {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        ctx.db().strings.mset(self.pairs).await?;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Mset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let args = parser.remaining();
        if args.len() % 2 != 0 {
            return Err(parser.wrong_arity().into());
        }

        let pairs = args.into_iter().tuples().collect();

        Ok(Self { pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    #[tokio::test]
    async fn sets_every_pair() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("MSET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("Hello")),
            Frame::Bulk(Bytes::from("key2")),
            Frame::Bulk(Bytes::from("World")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Mset(Mset {
                pairs: vec![
                    (Bytes::from("key1"), Bytes::from("Hello")),
                    (Bytes::from("key2"), Bytes::from("World")),
                ]
            })
        );

        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::ok());

        let values = dispatcher
            .keyspace()
            .database(0)
            .strings
            .mget(&[Bytes::from("key1"), Bytes::from("key2")])
            .await
            .unwrap();
        assert_eq!(
            values,
            vec![Some(Bytes::from("Hello")), Some(Bytes::from("World"))]
        );
    }

    #[test]
    fn odd_number_of_arguments() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("MSET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("Hello")),
            Frame::Bulk(Bytes::from("key2")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'mset' command"
        );
    }
}
