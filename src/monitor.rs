use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use uuid::Uuid;

use crate::frame::Frame;
use crate::utils::time::now_secs_f64;

/// Connections in monitor mode, keyed by session id. Each one receives executed commands
/// through its channel and writes them to its own socket.
#[derive(Default)]
pub struct Monitors {
    clients: Mutex<HashMap<Uuid, UnboundedSender<Frame>>>,
}

impl Monitors {
    pub fn register(&self, id: Uuid, sender: UnboundedSender<Frame>) {
        self.clients().insert(id, sender);
    }

    pub fn remove(&self, id: &Uuid) {
        self.clients().remove(id);
    }

    pub fn is_empty(&self) -> bool {
        self.clients().is_empty()
    }

    pub fn len(&self) -> usize {
        self.clients().len()
    }

    /// Sends the line to every monitor. A monitor whose connection is gone is dropped from the
    /// registry, the caller never sees the failure.
    pub fn broadcast(&self, line: String) {
        self.clients().retain(|id, sender| {
            let delivered = sender.send(Frame::Simple(line.clone())).is_ok();
            if !delivered {
                warn!(monitor = %id, "removing disconnected monitor");
            }
            delivered
        });
    }

    fn clients(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, UnboundedSender<Frame>>> {
        self.clients.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Formats an executed command as `MONITOR` prints it:
/// `<unix-time> [<db> <client-addr>] "<cmd>" "<arg>" ...`.
pub fn format_line(db: usize, addr: &SocketAddr, args: &[Bytes]) -> String {
    let mut line = format!("{:.6} [{} {}]", now_secs_f64(), db, addr);
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg));
    }
    line
}

/// Quotes a binary string, escaping what would break the line.
fn quote(bytes: &[u8]) -> String {
    let mut quoted = String::with_capacity(bytes.len() + 2);
    quoted.push('"');

    for &byte in bytes {
        match byte {
            b'\\' => quoted.push_str("\\\\"),
            b'"' => quoted.push_str("\\\""),
            b'\n' => quoted.push_str("\\n"),
            b'\r' => quoted.push_str("\\r"),
            b'\t' => quoted.push_str("\\t"),
            0x07 => quoted.push_str("\\a"),
            0x08 => quoted.push_str("\\b"),
            byte if byte.is_ascii_graphic() || byte == b' ' => quoted.push(byte as char),
            byte => {
                let _ = write!(quoted, "\\x{:02x}", byte);
            }
        }
    }

    quoted.push('"');
    quoted
}
