use async_trait::async_trait;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the number of commands the server knows, two-level commands counting once per
/// subcommand.
///
/// Ref: <https://redis.io/docs/latest/commands/command-count/>
#[derive(Debug, PartialEq)]
pub struct CommandCount;

#[async_trait]
impl Executable for CommandCount {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        Ok(Frame::Integer(ctx.dispatcher.registry().len() as i64))
    }
}

impl TryFrom<&mut CommandParser> for CommandCount {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
