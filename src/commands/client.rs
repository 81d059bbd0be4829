use async_trait::async_trait;
use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Connection management subcommands.
///
/// Ref: <https://redis.io/docs/latest/commands/client/>
#[derive(Debug, PartialEq)]
pub enum Client {
    /// Ref: <https://redis.io/docs/latest/commands/client-id/>
    Id,
    /// Ref: <https://redis.io/docs/latest/commands/client-getname/>
    GetName,
    /// Ref: <https://redis.io/docs/latest/commands/client-setname/>
    SetName(String),
    /// Ref: <https://redis.io/docs/latest/commands/client-setinfo/>
    SetInfo(ClientInfo),
}

#[derive(Debug, PartialEq)]
pub enum ClientInfo {
    LibName(String),
    LibVer(String),
}

#[async_trait]
impl Executable for Client {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        let session = &mut *ctx.session;

        let res = match self {
            Client::Id => Frame::Integer(session.client_id as i64),
            Client::GetName => session
                .name
                .clone()
                .map_or(Frame::Null, |name| Frame::Bulk(Bytes::from(name))),
            Client::SetName(name) => {
                // An empty name clears it.
                session.name = (!name.is_empty()).then_some(name);
                Frame::ok()
            }
            Client::SetInfo(ClientInfo::LibName(name)) => {
                session.lib_name = Some(name);
                Frame::ok()
            }
            Client::SetInfo(ClientInfo::LibVer(version)) => {
                session.lib_ver = Some(version);
                Frame::ok()
            }
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Client {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let client = match parser.command() {
            "client|id" => Client::Id,
            "client|getname" => Client::GetName,
            "client|setname" => {
                let name = parser.next_string()?;
                if !is_valid_name(&name) {
                    return Err(CommandParserError::invalid(
                        "Client names cannot contain spaces, newlines or special characters.",
                    )
                    .into());
                }
                Client::SetName(name)
            }
            "client|setinfo" => {
                let attribute = parser.next_keyword()?;
                let value = parser.next_string()?;
                if !is_valid_name(&value) {
                    return Err(CommandParserError::invalid(&format!(
                        "{} cannot contain spaces, newlines or special characters.",
                        attribute
                    ))
                    .into());
                }

                match attribute.as_str() {
                    "lib-name" => Client::SetInfo(ClientInfo::LibName(value)),
                    "lib-ver" => Client::SetInfo(ClientInfo::LibVer(value)),
                    _ => {
                        return Err(CommandParserError::invalid(&format!(
                            "Unrecognized option '{}'",
                            attribute
                        ))
                        .into())
                    }
                }
            }
            command => {
                return Err(CommandParserError::UnknownSubcommand {
                    command: "CLIENT".to_string(),
                    subcommand: command.trim_start_matches("client|").to_string(),
                }
                .into())
            }
        };

        Ok(client)
    }
}

/// Printable ASCII without spaces.
fn is_valid_name(name: &str) -> bool {
    name.bytes().all(|byte| byte.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::dispatcher::Dispatcher;
    use crate::session::Session;

    fn parse(args: &[&'static str]) -> Result<Command, Error> {
        let frame = Frame::Array(
            args.iter()
                .map(|arg| Frame::Bulk(Bytes::from(*arg)))
                .collect(),
        );
        Command::try_from(frame)
    }

    #[tokio::test]
    async fn set_and_get_name() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let cmd = parse(&["CLIENT", "GETNAME"]).unwrap();
        assert_eq!(cmd, Command::Client(Client::GetName));
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Null);

        let cmd = parse(&["CLIENT", "SETNAME", "worker-1"]).unwrap();
        assert_eq!(
            cmd,
            Command::Client(Client::SetName("worker-1".to_string()))
        );
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::ok());

        let cmd = parse(&["CLIENT", "GETNAME"]).unwrap();
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::Bulk(Bytes::from("worker-1")));
    }

    #[test]
    fn name_with_spaces() {
        let err = parse(&["CLIENT", "SETNAME", "my worker"]).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR Client names cannot contain spaces, newlines or special characters."
        );
    }

    #[tokio::test]
    async fn id() {
        let dispatcher = Dispatcher::default();
        let mut session = dispatcher.open_session("127.0.0.1:4000".parse().unwrap());

        let cmd = parse(&["client", "id"]).unwrap();
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(res, Frame::Integer(session.client_id as i64));
    }

    #[tokio::test]
    async fn set_info() {
        let dispatcher = Dispatcher::default();
        let mut session = Session::default();

        let cmd = parse(&["CLIENT", "SETINFO", "LIB-NAME", "redis-rs"]).unwrap();
        assert_eq!(
            cmd,
            Command::Client(Client::SetInfo(ClientInfo::LibName("redis-rs".to_string())))
        );
        dispatcher.execute(cmd, &mut session).await.unwrap();

        let cmd = parse(&["CLIENT", "SETINFO", "lib-ver", "0.25.4"]).unwrap();
        dispatcher.execute(cmd, &mut session).await.unwrap();

        assert_eq!(session.lib_name.as_deref(), Some("redis-rs"));
        assert_eq!(session.lib_ver.as_deref(), Some("0.25.4"));

        let err = parse(&["CLIENT", "SETINFO", "color", "blue"]).unwrap_err();
        assert_eq!(err.to_string(), "ERR Unrecognized option 'color'");
    }
}
