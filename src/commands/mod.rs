pub mod append;
pub mod auth;
pub mod bitcount;
pub mod client;
pub mod command;
pub mod decr;
pub mod decrby;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod expireat;
pub mod get;
pub mod getbit;
pub mod getrange;
pub mod getset;
pub mod hdel;
pub mod hexists;
pub mod hget;
pub mod hgetall;
pub mod hincrby;
pub mod hincrbyfloat;
pub mod hkeys;
pub mod hlen;
pub mod hmget;
pub mod hmset;
pub mod hset;
pub mod hsetnx;
pub mod hvals;
pub mod incr;
pub mod incrby;
pub mod incrbyfloat;
pub mod info;
pub mod mget;
pub mod monitor;
pub mod mset;
pub mod persist;
pub mod pexpire;
pub mod pexpireat;
pub mod ping;
pub mod psetex;
pub mod pttl;
pub mod quit;
pub mod registry;
pub mod sadd;
pub mod scard;
pub mod sdiff;
pub mod sdiffstore;
pub mod select;
pub mod set;
pub mod setbit;
pub mod setex;
pub mod setnx;
pub mod setrange;
pub mod sinter;
pub mod sinterstore;
pub mod sismember;
pub mod smembers;
pub mod smove;
pub mod spop;
pub mod srandmember;
pub mod srem;
pub mod strlen;
pub mod sunion;
pub mod sunionstore;
pub mod ttl;
pub mod type_;

use async_trait::async_trait;
use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::{Context, Executable};
use crate::frame::Frame;
use crate::utils::number;
use crate::Error;

use append::Append;
use auth::Auth;
use bitcount::Bitcount;
use client::Client;
use command::CommandCount;
use decr::Decr;
use decrby::DecrBy;
use del::Del;
use echo::Echo;
use exists::Exists;
use expire::Expire;
use expireat::ExpireAt;
use get::Get;
use getbit::Getbit;
use getrange::Getrange;
use getset::Getset;
use hdel::Hdel;
use hexists::Hexists;
use hget::Hget;
use hgetall::Hgetall;
use hincrby::HincrBy;
use hincrbyfloat::HincrByFloat;
use hkeys::Hkeys;
use hlen::Hlen;
use hmget::Hmget;
use hmset::Hmset;
use hset::Hset;
use hsetnx::Hsetnx;
use hvals::Hvals;
use incr::Incr;
use incrby::IncrBy;
use incrbyfloat::IncrByFloat;
use info::Info;
use mget::Mget;
use monitor::Monitor;
use mset::Mset;
use persist::Persist;
use pexpire::Pexpire;
use pexpireat::PexpireAt;
use ping::Ping;
use psetex::Psetex;
use pttl::Pttl;
use quit::Quit;
use sadd::Sadd;
use scard::Scard;
use sdiff::Sdiff;
use sdiffstore::SdiffStore;
use select::Select;
use set::Set;
use setbit::Setbit;
use setex::Setex;
use setnx::Setnx;
use setrange::Setrange;
use sinter::Sinter;
use sinterstore::SinterStore;
use sismember::Sismember;
use smembers::Smembers;
use smove::Smove;
use spop::Spop;
use srandmember::Srandmember;
use srem::Srem;
use strlen::Strlen;
use sunion::Sunion;
use sunionstore::SunionStore;
use ttl::Ttl;
use type_::Type;

#[derive(Debug, PartialEq)]
pub enum Command {
    Append(Append),
    Bitcount(Bitcount),
    Decr(Decr),
    DecrBy(DecrBy),
    Get(Get),
    Getbit(Getbit),
    Getrange(Getrange),
    Getset(Getset),
    Incr(Incr),
    IncrBy(IncrBy),
    IncrByFloat(IncrByFloat),
    Mget(Mget),
    Mset(Mset),
    Psetex(Psetex),
    Set(Set),
    Setbit(Setbit),
    Setex(Setex),
    Setnx(Setnx),
    Setrange(Setrange),
    Strlen(Strlen),

    Del(Del),
    Exists(Exists),
    Expire(Expire),
    ExpireAt(ExpireAt),
    Persist(Persist),
    Pexpire(Pexpire),
    PexpireAt(PexpireAt),
    Pttl(Pttl),
    Ttl(Ttl),
    Type(Type),

    Hdel(Hdel),
    Hexists(Hexists),
    Hget(Hget),
    Hgetall(Hgetall),
    HincrBy(HincrBy),
    HincrByFloat(HincrByFloat),
    Hkeys(Hkeys),
    Hlen(Hlen),
    Hmget(Hmget),
    Hmset(Hmset),
    Hset(Hset),
    Hsetnx(Hsetnx),
    Hvals(Hvals),

    Sadd(Sadd),
    Scard(Scard),
    Sdiff(Sdiff),
    SdiffStore(SdiffStore),
    Sinter(Sinter),
    SinterStore(SinterStore),
    Sismember(Sismember),
    Smembers(Smembers),
    Smove(Smove),
    Spop(Spop),
    Srandmember(Srandmember),
    Srem(Srem),
    Sunion(Sunion),
    SunionStore(SunionStore),

    Auth(Auth),
    Client(Client),
    CommandCount(CommandCount),
    Echo(Echo),
    Info(Info),
    Monitor(Monitor),
    Ping(Ping),
    Quit(Quit),
    Select(Select),
}

#[async_trait]
impl Executable for Command {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        match self {
            Command::Append(cmd) => cmd.exec(ctx).await,
            Command::Bitcount(cmd) => cmd.exec(ctx).await,
            Command::Decr(cmd) => cmd.exec(ctx).await,
            Command::DecrBy(cmd) => cmd.exec(ctx).await,
            Command::Get(cmd) => cmd.exec(ctx).await,
            Command::Getbit(cmd) => cmd.exec(ctx).await,
            Command::Getrange(cmd) => cmd.exec(ctx).await,
            Command::Getset(cmd) => cmd.exec(ctx).await,
            Command::Incr(cmd) => cmd.exec(ctx).await,
            Command::IncrBy(cmd) => cmd.exec(ctx).await,
            Command::IncrByFloat(cmd) => cmd.exec(ctx).await,
            Command::Mget(cmd) => cmd.exec(ctx).await,
            Command::Mset(cmd) => cmd.exec(ctx).await,
            Command::Psetex(cmd) => cmd.exec(ctx).await,
            Command::Set(cmd) => cmd.exec(ctx).await,
            Command::Setbit(cmd) => cmd.exec(ctx).await,
            Command::Setex(cmd) => cmd.exec(ctx).await,
            Command::Setnx(cmd) => cmd.exec(ctx).await,
            Command::Setrange(cmd) => cmd.exec(ctx).await,
            Command::Strlen(cmd) => cmd.exec(ctx).await,
            Command::Del(cmd) => cmd.exec(ctx).await,
            Command::Exists(cmd) => cmd.exec(ctx).await,
            Command::Expire(cmd) => cmd.exec(ctx).await,
            Command::ExpireAt(cmd) => cmd.exec(ctx).await,
            Command::Persist(cmd) => cmd.exec(ctx).await,
            Command::Pexpire(cmd) => cmd.exec(ctx).await,
            Command::PexpireAt(cmd) => cmd.exec(ctx).await,
            Command::Pttl(cmd) => cmd.exec(ctx).await,
            Command::Ttl(cmd) => cmd.exec(ctx).await,
            Command::Type(cmd) => cmd.exec(ctx).await,
            Command::Hdel(cmd) => cmd.exec(ctx).await,
            Command::Hexists(cmd) => cmd.exec(ctx).await,
            Command::Hget(cmd) => cmd.exec(ctx).await,
            Command::Hgetall(cmd) => cmd.exec(ctx).await,
            Command::HincrBy(cmd) => cmd.exec(ctx).await,
            Command::HincrByFloat(cmd) => cmd.exec(ctx).await,
            Command::Hkeys(cmd) => cmd.exec(ctx).await,
            Command::Hlen(cmd) => cmd.exec(ctx).await,
            Command::Hmget(cmd) => cmd.exec(ctx).await,
            Command::Hmset(cmd) => cmd.exec(ctx).await,
            Command::Hset(cmd) => cmd.exec(ctx).await,
            Command::Hsetnx(cmd) => cmd.exec(ctx).await,
            Command::Hvals(cmd) => cmd.exec(ctx).await,
            Command::Sadd(cmd) => cmd.exec(ctx).await,
            Command::Scard(cmd) => cmd.exec(ctx).await,
            Command::Sdiff(cmd) => cmd.exec(ctx).await,
            Command::SdiffStore(cmd) => cmd.exec(ctx).await,
            Command::Sinter(cmd) => cmd.exec(ctx).await,
            Command::SinterStore(cmd) => cmd.exec(ctx).await,
            Command::Sismember(cmd) => cmd.exec(ctx).await,
            Command::Smembers(cmd) => cmd.exec(ctx).await,
            Command::Smove(cmd) => cmd.exec(ctx).await,
            Command::Spop(cmd) => cmd.exec(ctx).await,
            Command::Srandmember(cmd) => cmd.exec(ctx).await,
            Command::Srem(cmd) => cmd.exec(ctx).await,
            Command::Sunion(cmd) => cmd.exec(ctx).await,
            Command::SunionStore(cmd) => cmd.exec(ctx).await,
            Command::Auth(cmd) => cmd.exec(ctx).await,
            Command::Client(cmd) => cmd.exec(ctx).await,
            Command::CommandCount(cmd) => cmd.exec(ctx).await,
            Command::Echo(cmd) => cmd.exec(ctx).await,
            Command::Info(cmd) => cmd.exec(ctx).await,
            Command::Monitor(cmd) => cmd.exec(ctx).await,
            Command::Ping(cmd) => cmd.exec(ctx).await,
            Command::Quit(cmd) => cmd.exec(ctx).await,
            Command::Select(cmd) => cmd.exec(ctx).await,
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    /// Parses a request without going through a registry, so no arity check and no statistics.
    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        let parser = &mut CommandParser::try_from(frame)?;
        let def = registry::resolve(parser, registry::find)?;

        def.parse(parser)
    }
}

/// Cursor over the arguments of a request. Clients send commands as RESP arrays of bulk
/// strings; every argument is kept as raw bytes and converted on demand.
#[derive(Debug)]
pub struct CommandParser {
    command: &'static str,
    args: Vec<Bytes>,
    parts: vec::IntoIter<Bytes>,
}

impl TryFrom<Frame> for CommandParser {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let args = frames
            .into_iter()
            .map(|frame| match frame {
                // Both `Simple` and `Bulk` representation may be strings.
                Frame::Simple(s) => Ok(Bytes::from(s)),
                Frame::Bulk(bytes) => Ok(bytes),
                Frame::Integer(i) => Ok(Bytes::from(i.to_string())),
                frame => Err(CommandParserError::InvalidFrame {
                    expected: "simple or bulk string".to_string(),
                    actual: frame,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommandParser {
            command: "",
            parts: args.clone().into_iter(),
            args,
        })
    }
}

impl CommandParser {
    /// Registry name of the command being parsed, e.g. `get` or `client|setname`.
    pub fn command(&self) -> &'static str {
        self.command
    }

    pub(crate) fn set_command(&mut self, command: &'static str) {
        self.command = command;
    }

    /// Every argument of the request, command name included.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn peek(&self) -> Option<&Bytes> {
        self.parts.as_slice().first()
    }

    pub fn has_next(&self) -> bool {
        self.peek().is_some()
    }

    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let bytes = self.next_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).to_lowercase())
    }

    pub fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        self.parts.next().ok_or(CommandParserError::EndOfStream)
    }

    pub fn next_string(&mut self) -> Result<String, CommandParserError> {
        let bytes = self.next_bytes()?;
        str::from_utf8(&bytes[..])
            .map(|s| s.to_string())
            .map_err(CommandParserError::InvalidUTF8String)
    }

    /// Next argument lower cased, for matching options.
    pub fn next_keyword(&mut self) -> Result<String, CommandParserError> {
        let bytes = self.next_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).to_lowercase())
    }

    pub fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let bytes = self.next_bytes()?;
        number::parse_integer(&bytes).ok_or(CommandParserError::NotAnInteger)
    }

    pub fn next_float(&mut self) -> Result<f64, CommandParserError> {
        let bytes = self.next_bytes()?;
        number::parse_float(&bytes).ok_or(CommandParserError::NotAFloat)
    }

    /// Consumes every argument left.
    pub fn remaining(&mut self) -> Vec<Bytes> {
        self.parts.by_ref().collect()
    }

    /// Fails when arguments are left over.
    pub fn finish(&self) -> Result<(), CommandParserError> {
        if self.has_next() {
            return Err(CommandParserError::Syntax);
        }
        Ok(())
    }

    pub fn wrong_arity(&self) -> CommandParserError {
        CommandParserError::WrongArity {
            command: self.command.to_string(),
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("ERR Protocol error: expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("ERR unknown command '{command}', with args beginning with: {args}")]
    UnknownCommand { command: String, args: String },
    #[error("ERR unknown subcommand '{subcommand}'. Try {command} HELP.")]
    UnknownSubcommand { command: String, subcommand: String },
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR value is not a valid float")]
    NotAFloat,
    #[error("ERR syntax error")]
    Syntax,
    #[error("ERR bit offset is not an integer or out of range")]
    BitOffset,
    #[error("ERR bit is not an integer or out of range")]
    BitValue,
    #[error("ERR invalid expire time in '{command}' command")]
    InvalidExpireTime { command: String },
    #[error("ERR {message}")]
    InvalidCommandArgument { message: String },
    #[error("ERR Protocol error: invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    /// A command ran out of arguments while reading its options.
    #[error("ERR syntax error")]
    EndOfStream,
}

impl CommandParserError {
    pub(crate) fn invalid(message: &str) -> Self {
        CommandParserError::InvalidCommandArgument {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get_command_with_simple_string() {
        let get_frame = Frame::Array(vec![
            Frame::Simple(String::from("GET")),
            Frame::Simple(String::from("foo")),
        ]);

        let get_command = Command::try_from(get_frame).unwrap();

        assert_eq!(
            get_command,
            Command::Get(Get {
                key: Bytes::from("foo")
            })
        );
    }

    #[test]
    fn parse_get_command_with_bulk_string() {
        let get_frame = Frame::Array(vec![
            Frame::Simple(String::from("GET")),
            Frame::Bulk(Bytes::from("foo-from-bytes")),
        ]);

        let get_command = Command::try_from(get_frame).unwrap();

        assert_eq!(
            get_command,
            Command::Get(Get {
                key: Bytes::from("foo-from-bytes")
            })
        );
    }

    #[test]
    fn parse_two_level_command() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("CLIENT")),
            Frame::Bulk(Bytes::from("SetName")),
            Frame::Bulk(Bytes::from("worker")),
        ]);

        let command = Command::try_from(frame).unwrap();

        assert_eq!(
            command,
            Command::Client(Client::SetName("worker".to_string()))
        );
    }

    #[test]
    fn parse_unknown_command() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("FOO")),
            Frame::Bulk(Bytes::from("bar")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR unknown command 'FOO', with args beginning with: 'bar' "
        );
    }

    #[test]
    fn parse_unknown_subcommand() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("client")),
            Frame::Bulk(Bytes::from("kill")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR unknown subcommand 'kill'. Try CLIENT HELP."
        );
    }

    #[test]
    fn parse_non_array_frame() {
        let err = Command::try_from(Frame::Simple("GET".to_string())).unwrap_err();

        assert!(err.to_string().starts_with("ERR Protocol error"));
    }

    #[test]
    fn parser_reads_typed_arguments() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("x")),
            Frame::Bulk(Bytes::from("42")),
            Frame::Bulk(Bytes::from("1.5")),
            Frame::Bulk(Bytes::from("EX")),
            Frame::Bulk(Bytes::from("nan")),
        ]);
        let mut parser = CommandParser::try_from(frame).unwrap();

        assert_eq!(parser.argc(), 5);
        assert_eq!(parser.parse_command_name().unwrap(), "x");
        assert_eq!(parser.next_integer().unwrap(), 42);
        assert_eq!(parser.next_float().unwrap(), 1.5);
        assert_eq!(parser.next_keyword().unwrap(), "ex");
        assert_eq!(parser.next_float(), Err(CommandParserError::NotAFloat));
        assert_eq!(parser.next_bytes(), Err(CommandParserError::EndOfStream));
        assert!(parser.finish().is_ok());
    }
}
