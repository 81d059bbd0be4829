//! The command table. Every command the server knows is declared once here with its arity and
//! flags; the dispatcher builds a [`Registry`] from it at start up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::commands::*;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Flag {
    /// Never shown to monitors.
    Admin,
    /// Not echoed to monitors, e.g. because the arguments are secret.
    SkipMonitor,
}

pub struct CommandDef {
    /// Lower cased, two-level commands are named `command|subcommand`.
    pub name: &'static str,
    /// Argument count including the command name. Positive means exactly, `-N` at least `N`.
    pub arity: i32,
    pub flags: &'static [Flag],
    parse: fn(&mut CommandParser) -> Result<Command, Error>,
}

impl CommandDef {
    pub fn is_admin(&self) -> bool {
        self.flags.contains(&Flag::Admin)
    }

    pub fn skip_monitor(&self) -> bool {
        self.flags.contains(&Flag::SkipMonitor)
    }

    pub fn check_arity(&self, argc: usize) -> bool {
        let argc = argc as i64;
        let arity = self.arity as i64;

        if arity >= 0 {
            argc == arity
        } else {
            argc >= -arity
        }
    }

    pub fn parse(&self, parser: &mut CommandParser) -> Result<Command, Error> {
        (self.parse)(parser)
    }
}

macro_rules! command {
    ($name:literal, $arity:literal, $variant:ident) => {
        command!($name, $arity, [], $variant)
    };
    ($name:literal, $arity:literal, [$($flag:ident),*], $variant:ident) => {
        CommandDef {
            name: $name,
            arity: $arity,
            flags: &[$(Flag::$flag),*],
            parse: |parser| $variant::try_from(parser).map(Command::$variant),
        }
    };
}

pub static COMMAND_TABLE: &[CommandDef] = &[
    // Connection and server.
    command!("auth", 2, [SkipMonitor], Auth),
    command!("client|getname", 2, Client),
    command!("client|id", 2, Client),
    command!("client|setinfo", 4, Client),
    command!("client|setname", 3, Client),
    command!("command|count", 2, CommandCount),
    command!("echo", 2, Echo),
    command!("info", -1, Info),
    command!("monitor", 1, [Admin, SkipMonitor], Monitor),
    command!("ping", -1, Ping),
    command!("quit", 1, [SkipMonitor], Quit),
    command!("select", 2, Select),
    // Strings.
    command!("append", 3, Append),
    command!("bitcount", -2, Bitcount),
    command!("decr", 2, Decr),
    command!("decrby", 3, DecrBy),
    command!("get", 2, Get),
    command!("getbit", 3, Getbit),
    command!("getrange", 4, Getrange),
    command!("getset", 3, Getset),
    command!("incr", 2, Incr),
    command!("incrby", 3, IncrBy),
    command!("incrbyfloat", 3, IncrByFloat),
    command!("mget", -2, Mget),
    command!("mset", -3, Mset),
    command!("psetex", 4, Psetex),
    command!("set", -3, Set),
    command!("setbit", 4, Setbit),
    command!("setex", 4, Setex),
    command!("setnx", 3, Setnx),
    command!("setrange", 4, Setrange),
    command!("strlen", 2, Strlen),
    // Keyspace.
    command!("del", -2, Del),
    command!("exists", -2, Exists),
    command!("expire", 3, Expire),
    command!("expireat", 3, ExpireAt),
    command!("persist", 2, Persist),
    command!("pexpire", 3, Pexpire),
    command!("pexpireat", 3, PexpireAt),
    command!("pttl", 2, Pttl),
    command!("ttl", 2, Ttl),
    command!("type", 2, Type),
    // Hashes.
    command!("hdel", -3, Hdel),
    command!("hexists", 3, Hexists),
    command!("hget", 3, Hget),
    command!("hgetall", 2, Hgetall),
    command!("hincrby", 4, HincrBy),
    command!("hincrbyfloat", 4, HincrByFloat),
    command!("hkeys", 2, Hkeys),
    command!("hlen", 2, Hlen),
    command!("hmget", -3, Hmget),
    command!("hmset", -4, Hmset),
    command!("hset", -4, Hset),
    command!("hsetnx", 4, Hsetnx),
    command!("hvals", 2, Hvals),
    // Sets.
    command!("sadd", -3, Sadd),
    command!("scard", 2, Scard),
    command!("sdiff", -2, Sdiff),
    command!("sdiffstore", -2, SdiffStore),
    command!("sinter", -2, Sinter),
    command!("sinterstore", -2, SinterStore),
    command!("sismember", 3, Sismember),
    command!("smembers", 2, Smembers),
    command!("smove", 4, Smove),
    command!("spop", -2, Spop),
    command!("srandmember", 3, Srandmember),
    command!("srem", -3, Srem),
    command!("sunion", -2, Sunion),
    command!("sunionstore", -2, SunionStore),
];

/// Looks a command up in the static table.
pub fn find(name: &str) -> Option<&'static CommandDef> {
    COMMAND_TABLE.iter().find(|def| def.name == name)
}

/// Reads the command name, and the subcommand of two-level commands, from the parser and returns
/// the matching definition.
pub fn resolve<F>(
    parser: &mut CommandParser,
    find: F,
) -> Result<&'static CommandDef, CommandParserError>
where
    F: Fn(&str) -> Option<&'static CommandDef>,
{
    let name = parser.parse_command_name()?;

    let subcommand = parser
        .peek()
        .map(|sub| String::from_utf8_lossy(sub).to_lowercase());

    if let Some(subcommand) = &subcommand {
        if let Some(def) = find(&format!("{}|{}", name, subcommand)) {
            parser.next_bytes()?;
            parser.set_command(def.name);
            return Ok(def);
        }
    }

    if let Some(def) = find(&name) {
        parser.set_command(def.name);
        return Ok(def);
    }

    let container = format!("{}|", name);
    if COMMAND_TABLE.iter().any(|def| def.name.starts_with(&container)) {
        return Err(match parser.peek() {
            Some(subcommand) => CommandParserError::UnknownSubcommand {
                command: name.to_uppercase(),
                subcommand: String::from_utf8_lossy(subcommand).into_owned(),
            },
            None => CommandParserError::WrongArity { command: name },
        });
    }

    let args = parser
        .args()
        .iter()
        .skip(1)
        .map(|arg| format!("'{}' ", String::from_utf8_lossy(arg)))
        .collect::<String>();

    Err(CommandParserError::UnknownCommand {
        command: String::from_utf8_lossy(&parser.args()[0]).into_owned(),
        args,
    })
}

#[derive(Debug, Default)]
struct CommandStats {
    calls: AtomicU64,
    usec: AtomicU64,
}

struct Entry {
    def: &'static CommandDef,
    stats: CommandStats,
}

/// Per-command call statistics as reported by `INFO commandstats`.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandUsage {
    pub name: &'static str,
    pub calls: u64,
    pub usec: u64,
}

/// The command table plus per-command statistics. Built once and shared by every connection,
/// the counters are atomics so concurrent connections can update them.
pub struct Registry {
    entries: HashMap<&'static str, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        let entries = COMMAND_TABLE
            .iter()
            .map(|def| {
                let entry = Entry {
                    def,
                    stats: CommandStats::default(),
                };
                (def.name, entry)
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'static CommandDef> {
        self.entries.get(name).map(|entry| entry.def)
    }

    pub fn lookup(
        &self,
        parser: &mut CommandParser,
    ) -> Result<&'static CommandDef, CommandParserError> {
        resolve(parser, |name| self.get(name))
    }

    pub fn record(&self, name: &str, elapsed: Duration) {
        if let Some(entry) = self.entries.get(name) {
            entry.stats.calls.fetch_add(1, Ordering::Relaxed);
            entry
                .stats
                .usec
                .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        }
    }

    /// Commands called at least once, sorted by name.
    pub fn usage(&self) -> Vec<CommandUsage> {
        let mut usage: Vec<CommandUsage> = self
            .entries
            .values()
            .map(|entry| CommandUsage {
                name: entry.def.name,
                calls: entry.stats.calls.load(Ordering::Relaxed),
                usec: entry.stats.usec.load(Ordering::Relaxed),
            })
            .filter(|usage| usage.calls > 0)
            .collect();

        usage.sort_by(|a, b| a.name.cmp(b.name));
        usage
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
