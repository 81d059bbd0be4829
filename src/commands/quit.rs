use async_trait::async_trait;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Ask the server to close the connection. The connection is closed as soon as the OK reply has
/// been written.
///
/// Ref: <https://redis.io/docs/latest/commands/quit/>
#[derive(Debug, PartialEq)]
pub struct Quit;

#[async_trait]
impl Executable for Quit {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        ctx.session.quit = true;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Quit {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
