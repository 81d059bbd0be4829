use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Count the number of set bits (population counting) in a string, optionally limited to an
/// inclusive byte range.
///
/// Ref: <https://redis.io/docs/latest/commands/bitcount/>
#[derive(Debug, PartialEq)]
pub struct Bitcount {
    pub key: Bytes,
    pub range: Option<(i64, i64)>,
}

#[async_trait]
impl Executable for Bitcount {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let count = ctx.db().strings.bit_count(&self.key, self.range).await?;

        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Bitcount {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        let range = if parser.has_next() {
            let start = parser.next_integer()?;
            let end = match parser.next_integer() {
                Ok(end) => end,
                Err(CommandParserError::EndOfStream) => {
                    return Err(CommandParserError::Syntax.into())
                }
                Err(e) => return Err(e.into()),
            };
            Some((start, end))
        } else {
            None
        };

        parser.finish()?;

        Ok(Self { key, range })
    }
}
