use async_trait::async_trait;

use crate::dispatcher::Dispatcher;
use crate::frame::Frame;
use crate::keyspace::Database;
use crate::session::Session;
use crate::Error;

/// What a command runs against: the calling connection's session and the shared server state.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub dispatcher: &'a Dispatcher,
}

impl<'a> Context<'a> {
    /// The database selected by the session.
    pub fn db(&self) -> &'a Database {
        let dispatcher: &'a Dispatcher = self.dispatcher;
        dispatcher.keyspace().database(self.session.db)
    }
}

#[async_trait]
pub trait Executable {
    async fn exec(self, ctx: &mut Context<'_>) -> Result<Frame, Error>;
}
