use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the substring of the string value stored at key, determined by the offsets start and
/// end (both are inclusive). Negative offsets can be used in order to provide an offset starting
/// from the end of the string.
///
/// Ref: <https://redis.io/docs/latest/commands/getrange/>
#[derive(Debug, PartialEq)]
pub struct Getrange {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
}

#[async_trait]
impl Executable for Getrange {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let value = ctx
            .db()
            .strings
            .get_range(&self.key, self.start, self.end)
            .await?;

        Ok(Frame::Bulk(value))
    }
}

impl TryFrom<&mut CommandParser> for Getrange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let end = parser.next_integer()?;

        Ok(Self { key, start, end })
    }
}
