use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Removes the specified fields from the hash stored at key. Returns the number of fields that
/// were removed.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct Hdel {
    pub key: Bytes,
    pub fields: Vec<Bytes>,
}

#[async_trait]
impl Executable for Hdel {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let removed = ctx
            .db()
            .hashes
            .delete_fields(&self.key, &self.fields)
            .await?;

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hdel {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let fields = parser.remaining();

        Ok(Self { key, fields })
    }
}
