use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Write;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::dispatcher::Dispatcher;
use crate::frame::Frame;
use crate::Error;

const REDIS_VERSION: &str = "7.2.4";

const SECTIONS: &[&str] = &["server", "clients", "stats", "commandstats", "keyspace"];

/// Returns information and statistics about the server, one `# Section` block per requested
/// section. Without arguments, or with `all`, `default` or `everything`, every section is
/// included. Unknown sections are ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/info/>
#[derive(Debug, PartialEq)]
pub struct Info {
    pub sections: Vec<String>,
}

impl Info {
    fn wants(&self, section: &str) -> bool {
        self.sections.is_empty()
            || self.sections.iter().any(|requested| {
                requested == section || matches!(requested.as_str(), "all" | "default" | "everything")
            })
    }
}

#[async_trait]
impl Executable for Info {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let dispatcher = ctx.dispatcher;
        let mut blocks = Vec::new();

        for section in SECTIONS.iter().filter(|section| self.wants(section)) {
            let block = match *section {
                "server" => server(dispatcher),
                "clients" => clients(dispatcher),
                "stats" => stats(dispatcher),
                "commandstats" => commandstats(dispatcher),
                _ => keyspace(dispatcher).await?,
            };
            blocks.push(block);
        }

        Ok(Frame::Bulk(Bytes::from(blocks.join("\r\n"))))
    }
}

impl TryFrom<&mut CommandParser> for Info {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let mut sections = Vec::new();
        while parser.has_next() {
            sections.push(parser.next_keyword()?);
        }

        Ok(Self { sections })
    }
}

fn server(dispatcher: &Dispatcher) -> String {
    let uptime = dispatcher.uptime().as_secs();

    format!(
        "# Server\r\n\
         redis_version:{}\r\n\
         modis_version:{}\r\n\
         redis_mode:standalone\r\n\
         arch_bits:{}\r\n\
         process_id:{}\r\n\
         tcp_port:{}\r\n\
         uptime_in_seconds:{}\r\n\
         uptime_in_days:{}\r\n",
        REDIS_VERSION,
        env!("CARGO_PKG_VERSION"),
        usize::BITS,
        std::process::id(),
        dispatcher.port(),
        uptime,
        uptime / 86_400,
    )
}

fn clients(dispatcher: &Dispatcher) -> String {
    format!(
        "# Clients\r\n\
         connected_clients:{}\r\n\
         monitors:{}\r\n",
        dispatcher.connected_clients(),
        dispatcher.monitors().len(),
    )
}

fn stats(dispatcher: &Dispatcher) -> String {
    format!(
        "# Stats\r\n\
         total_connections_received:{}\r\n\
         total_commands_processed:{}\r\n",
        dispatcher.total_connections(),
        dispatcher.total_commands(),
    )
}

fn commandstats(dispatcher: &Dispatcher) -> String {
    let mut block = String::from("# Commandstats\r\n");

    for usage in dispatcher.registry().usage() {
        let per_call = usage.usec as f64 / usage.calls as f64;
        let _ = write!(
            block,
            "cmdstat_{}:calls={},usec={},usec_per_call={:.2}\r\n",
            usage.name, usage.calls, usage.usec, per_call
        );
    }

    block
}

/// Only databases holding keys are listed.
async fn keyspace(dispatcher: &Dispatcher) -> Result<String, Error> {
    let mut block = String::from("# Keyspace\r\n");

    for (index, db) in dispatcher.keyspace().iter().enumerate() {
        let keys = db.key_count().await?;
        if keys > 0 {
            let _ = write!(block, "db{}:keys={}\r\n", index, keys);
        }
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::session::Session;

    async fn info(dispatcher: &Dispatcher, sections: &[&str]) -> String {
        let mut session = Session::default();
        let cmd = Command::Info(Info {
            sections: sections.iter().map(|s| s.to_string()).collect(),
        });

        match dispatcher.execute(cmd, &mut session).await.unwrap() {
            Frame::Bulk(bytes) => String::from_utf8(bytes.to_vec()).unwrap(),
            frame => panic!("expected a bulk reply, got {:?}", frame),
        }
    }

    #[test]
    fn parse_sections() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("INFO")),
            Frame::Bulk(Bytes::from("Server")),
            Frame::Bulk(Bytes::from("keyspace")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Info(Info {
                sections: vec!["server".to_string(), "keyspace".to_string()]
            })
        );
    }

    #[tokio::test]
    async fn every_section_by_default() {
        let dispatcher = Dispatcher::default();

        let text = info(&dispatcher, &[]).await;

        for header in ["# Server", "# Clients", "# Stats", "# Commandstats", "# Keyspace"] {
            assert!(text.contains(header), "missing {}", header);
        }
        assert!(text.contains("redis_version:7.2.4\r\n"));
    }

    #[tokio::test]
    async fn single_section() {
        let dispatcher = Dispatcher::default();

        let text = info(&dispatcher, &["clients"]).await;

        assert!(text.starts_with("# Clients\r\n"));
        assert!(!text.contains("# Server"));
    }

    #[tokio::test]
    async fn keyspace_counts_keys_per_database() {
        let dispatcher = Dispatcher::default();
        let db = dispatcher.keyspace().database(0);
        db.strings
            .set(&Bytes::from("s"), Bytes::from("v"), None)
            .await
            .unwrap();
        db.sets
            .add(&Bytes::from("t"), vec![Bytes::from("a"), Bytes::from("b")])
            .await
            .unwrap();
        dispatcher
            .keyspace()
            .database(3)
            .hashes
            .set(&Bytes::from("h"), vec![(Bytes::from("f"), Bytes::from("v"))])
            .await
            .unwrap();

        let text = info(&dispatcher, &["keyspace"]).await;

        assert_eq!(text, "# Keyspace\r\ndb0:keys=2\r\ndb3:keys=1\r\n");
    }

    #[tokio::test]
    async fn commandstats() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();
        let request = Frame::Array(vec![Frame::Bulk(Bytes::from("PING"))]);
        dispatcher.dispatch(request, &mut session).await;

        let text = info(&dispatcher, &["commandstats"]).await;

        assert!(text.contains("cmdstat_ping:calls=1,"));
    }
}
