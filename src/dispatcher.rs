use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error as ThisError;
use tracing::{debug, error};

use crate::backend::{Backend, MemoryBackend};
use crate::commands::executable::{Context, Executable};
use crate::commands::registry::Registry;
use crate::commands::{Command, CommandParser, CommandParserError};
use crate::config::Config;
use crate::frame::Frame;
use crate::keyspace::{Keyspace, StoreError};
use crate::monitor::{self, Monitors};
use crate::session::Session;
use crate::Error;

#[derive(Debug, ThisError, PartialEq)]
pub enum AuthError {
    #[error("NOAUTH Authentication required.")]
    Required,
    #[error("WRONGPASS invalid username-password pair or user is disabled.")]
    WrongPassword,
    #[error("ERR AUTH <password> called without any password configured for the default user. Are you sure your configuration is correct?")]
    NoPasswordConfigured,
}

/// Server state shared by every connection: the command registry, the keyspace and the monitor
/// registry. Requests go through [`Dispatcher::dispatch`], which turns any failure into an error
/// reply so a connection never dies because of a command.
pub struct Dispatcher {
    registry: Registry,
    keyspace: Keyspace,
    monitors: Monitors,
    password: Option<String>,
    port: u16,
    started_at: Instant,
    next_client_id: AtomicU64,
    connected_clients: AtomicUsize,
    total_commands: AtomicU64,
}

impl Dispatcher {
    pub fn new(config: &Config, backend: Arc<dyn Backend>) -> Self {
        Self {
            registry: Registry::new(),
            keyspace: Keyspace::new(backend, &config.namespace, config.databases),
            monitors: Monitors::default(),
            password: config.password.clone(),
            port: config.port,
            started_at: Instant::now(),
            next_client_id: AtomicU64::new(1),
            connected_clients: AtomicUsize::new(0),
            total_commands: AtomicU64::new(0),
        }
    }

    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn monitors(&self) -> &Monitors {
        &self.monitors
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn connected_clients(&self) -> usize {
        self.connected_clients.load(Ordering::Relaxed)
    }

    pub fn total_connections(&self) -> u64 {
        self.next_client_id.load(Ordering::Relaxed) - 1
    }

    pub fn total_commands(&self) -> u64 {
        self.total_commands.load(Ordering::Relaxed)
    }

    /// Registers a new connection. Without a configured password every session starts
    /// authenticated.
    pub fn open_session(&self, addr: SocketAddr) -> Session {
        let client_id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        self.connected_clients.fetch_add(1, Ordering::Relaxed);

        let mut session = Session::new(client_id, addr);
        session.authenticated = self.password.is_none();
        session
    }

    pub fn close_session(&self, session: &Session) {
        self.connected_clients.fetch_sub(1, Ordering::Relaxed);
        self.monitors.remove(&session.id);
    }

    pub fn authenticate(&self, password: &str) -> Result<(), AuthError> {
        match &self.password {
            None => Err(AuthError::NoPasswordConfigured),
            Some(expected) if expected == password => Ok(()),
            Some(_) => Err(AuthError::WrongPassword),
        }
    }

    /// Runs one request and returns its reply.
    pub async fn dispatch(&self, frame: Frame, session: &mut Session) -> Frame {
        session.commands_processed += 1;
        self.total_commands.fetch_add(1, Ordering::Relaxed);

        match self.try_dispatch(frame, session).await {
            Ok(reply) => reply,
            Err(err) => error_reply(err),
        }
    }

    async fn try_dispatch(&self, frame: Frame, session: &mut Session) -> Result<Frame, Error> {
        let mut parser = CommandParser::try_from(frame)?;
        let def = self.registry.lookup(&mut parser)?;

        if self.password.is_some() && !session.authenticated && def.name != "auth" {
            return Err(AuthError::Required.into());
        }

        if !def.check_arity(parser.argc()) {
            return Err(parser.wrong_arity().into());
        }

        // Keep the raw arguments around for monitors, the parser consumes them.
        let args = (!def.is_admin() && !def.skip_monitor() && !self.monitors.is_empty())
            .then(|| parser.args().to_vec());
        let db = session.db;

        let command = def.parse(&mut parser)?;
        debug!(command = def.name, "executing command");

        let started_at = Instant::now();
        let reply = self.execute(command, session).await;
        self.registry.record(def.name, started_at.elapsed());
        let reply = reply?;

        if let Some(args) = args {
            self.monitors
                .broadcast(monitor::format_line(db, &session.addr, &args));
        }

        Ok(reply)
    }

    /// Executes an already parsed command, skipping the registry checks.
    pub async fn execute(&self, command: Command, session: &mut Session) -> Result<Frame, Error> {
        let mut ctx = Context {
            session,
            dispatcher: self,
        };
        command.exec(&mut ctx).await
    }
}

impl Default for Dispatcher {
    /// A dispatcher over a fresh in-memory backend. Must be called within a Tokio runtime.
    fn default() -> Self {
        Self::new(&Config::default(), Arc::new(MemoryBackend::new()))
    }
}

/// Typed errors carry the exact reply text, anything else is unexpected and gets logged.
fn error_reply(err: Error) -> Frame {
    if let Some(err) = err.downcast_ref::<CommandParserError>() {
        return Frame::Error(err.to_string());
    }
    if let Some(err) = err.downcast_ref::<AuthError>() {
        return Frame::Error(err.to_string());
    }
    if let Some(err) = err.downcast_ref::<StoreError>() {
        if let StoreError::Backend(backend_err) = err {
            error!(error = %backend_err, "backend failure");
        }
        return Frame::Error(err.to_string());
    }

    error!(error = %err, "command failed");
    Frame::Error(format!("ERR {}", err))
}
