use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns if field is an existing field in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hexists/>
#[derive(Debug, PartialEq)]
pub struct Hexists {
    pub key: Bytes,
    pub field: Bytes,
}

#[async_trait]
impl Executable for Hexists {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let exists = ctx
            .db()
            .hashes
            .exists_field(&self.key, &self.field)
            .await?;

        Ok(Frame::Integer(exists as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hexists {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;

        Ok(Self { key, field })
    }
}
