use std::net::{Ipv4Addr, SocketAddr};
use uuid::Uuid;

/// Per-connection state. Commands from one connection run sequentially, so the session is owned
/// by the connection task and handed to each command by mutable reference.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    /// Numeric id reported by `CLIENT ID`.
    pub client_id: u64,
    pub addr: SocketAddr,
    pub name: Option<String>,
    /// Reported by the client through `CLIENT SETINFO`.
    pub lib_name: Option<String>,
    pub lib_ver: Option<String>,
    pub authenticated: bool,
    /// Index of the selected logical database.
    pub db: usize,
    /// Set by `MONITOR`, the connection switches to monitor mode after replying.
    pub monitor: bool,
    /// Set by `QUIT`, the connection closes after replying.
    pub quit: bool,
    pub commands_processed: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl Session {
    pub fn new(client_id: u64, addr: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            addr,
            name: None,
            lib_name: None,
            lib_ver: None,
            authenticated: false,
            db: 0,
            monitor: false,
            quit: false,
            commands_processed: 0,
            bytes_read: 0,
            bytes_written: 0,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(0, SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
    }
}
