use async_trait::async_trait;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Streams back every command processed by the server. The connection registers itself as a
/// monitor right before the OK reply is written.
///
/// Ref: <https://redis.io/docs/latest/commands/monitor/>
#[derive(Debug, PartialEq)]
pub struct Monitor;

#[async_trait]
impl Executable for Monitor {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        ctx.session.monitor = true;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Monitor {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
