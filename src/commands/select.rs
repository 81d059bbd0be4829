use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Select the Redis logical database having the specified zero-based numeric index. New
/// connections always use the database 0.
///
/// Ref: <https://redis.io/docs/latest/commands/select/>
#[derive(Debug, PartialEq)]
pub struct Select {
    pub index: i64,
}

#[async_trait]
impl Executable for Select {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let index = usize::try_from(self.index)
            .ok()
            .filter(|index| *index < ctx.dispatcher.keyspace().len())
            .ok_or_else(|| CommandParserError::invalid("DB index is out of range"))?;

        ctx.session.db = index;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Select {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let index = parser.next_integer()?;

        Ok(Self { index })
    }
}
