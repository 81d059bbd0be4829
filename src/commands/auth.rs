use async_trait::async_trait;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Authenticates the current connection against the server password.
///
/// Ref: <https://redis.io/docs/latest/commands/auth/>
#[derive(PartialEq)]
pub struct Auth {
    pub password: String,
}

// Keeps the password out of logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth").finish_non_exhaustive()
    }
}

#[async_trait]
impl Executable for Auth {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error> {
        ctx.dispatcher.authenticate(&self.password)?;
        ctx.session.authenticated = true;

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Auth {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let password = parser.next_string()?;

        Ok(Self { password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::commands::Command;
    use crate::config::Config;
    use crate::dispatcher::{AuthError, Dispatcher};
    use crate::session::Session;
    use bytes::Bytes;
    use std::sync::Arc;

    fn protected() -> Dispatcher {
        let config = Config {
            password: Some("secret".to_string()),
            ..Config::default()
        };
        Dispatcher::new(&config, Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn right_and_wrong_password() {
        let dispatcher = protected();
        let mut session = Session::default();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("AUTH")),
            Frame::Bulk(Bytes::from("nope")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Auth(Auth {
                password: "nope".to_string()
            })
        );

        let err = dispatcher.execute(cmd, &mut session).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AuthError>(),
            Some(&AuthError::WrongPassword)
        );
        assert!(!session.authenticated);

        let cmd = Command::Auth(Auth {
            password: "secret".to_string(),
        });
        let res = dispatcher.execute(cmd, &mut session).await.unwrap();
        assert_eq!(res, Frame::ok());
        assert!(session.authenticated);
    }

    #[test]
    fn debug_hides_password() {
        let auth = Auth {
            password: "secret".to_string(),
        };

        assert!(!format!("{:?}", auth).contains("secret"));
    }
}
