use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Sets field in the hash stored at key to value, only if field does not yet exist.
///
/// Ref: <https://redis.io/docs/latest/commands/hsetnx/>
#[derive(Debug, PartialEq)]
pub struct Hsetnx {
    pub key: Bytes,
    pub field: Bytes,
    pub value: Bytes,
}

#[async_trait]
impl Executable for Hsetnx {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let written = ctx
            .db()
            .hashes
            .set_if_absent(&self.key, &self.field, self.value)
            .await?;

        Ok(Frame::Integer(written as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hsetnx {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, field, value })
    }
}
