use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the number of keys that exist among the ones given. A key mentioned multiple times
/// is counted multiple times.
///
/// Ref: <https://redis.io/docs/latest/commands/exists/>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<Bytes>,
}

#[async_trait]
impl Executable for Exists {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let count = ctx.db().exists(&self.keys).await?;

        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Exists {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining();

        Ok(Self { keys })
    }
}
