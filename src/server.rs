use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::backend::{Backend, MemoryBackend};
use crate::config::Config;
use crate::connection::Connection;
use crate::dispatcher::Dispatcher;
use crate::frame::{self, Frame};
use crate::session::Session;
use crate::Error;

/// Installs logging, binds the configured address and serves over an in-memory backend.
pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.bind.as_str(), config.port)).await?;
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());

    serve(listener, config, backend).await
}

/// Accepts connections until the listener fails, one task per connection.
pub async fn serve(
    listener: TcpListener,
    mut config: Config,
    backend: Arc<dyn Backend>,
) -> Result<(), Error> {
    let local_addr = listener.local_addr()?;
    // Reported by INFO, the configured one may be 0.
    config.port = local_addr.port();

    let dispatcher = Arc::new(Dispatcher::new(&config, backend));
    info!(databases = config.databases, "modis listening on {}", local_addr);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let dispatcher = dispatcher.clone();
        let max_frame_size = config.max_frame_size;
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, client_address, dispatcher, max_frame_size).await
            {
                error!(error = %e, "connection failed");
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip_all,
    fields(connection_id, client_address = %client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    max_frame_size: usize,
) -> Result<(), Error> {
    let mut conn = Connection::with_max_frame_size(stream, max_frame_size);
    let mut session = dispatcher.open_session(client_address);

    tracing::Span::current().record("connection_id", session.client_id);

    let res = serve_session(&mut conn, &mut session, &dispatcher).await;
    dispatcher.close_session(&session);

    info!(
        commands = session.commands_processed,
        bytes_read = session.bytes_read,
        bytes_written = session.bytes_written,
        "Connection closed"
    );
    res
}

/// Request/reply loop. Commands of one connection run strictly one after the other.
async fn serve_session(
    conn: &mut Connection,
    session: &mut Session,
    dispatcher: &Dispatcher,
) -> Result<(), Error> {
    loop {
        let frame = match conn.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(()),
            Err(err) => return reply_protocol_error(conn, err).await,
        };

        // `*0\r\n` is a no-op.
        if matches!(&frame, Frame::Array(args) if args.is_empty()) {
            continue;
        }

        debug!("Received request");
        let reply = dispatcher.dispatch(frame, session).await;

        // Registered before the reply goes out, so the client sees every command after `+OK`.
        let monitor_rx = session.monitor.then(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            dispatcher.monitors().register(session.id, tx);
            rx
        });

        conn.write_frame(reply).await?;
        record_traffic(conn, session);

        if session.quit {
            return Ok(());
        }
        if let Some(rx) = monitor_rx {
            return monitor(conn, session, dispatcher, rx).await;
        }
    }
}

/// Monitor mode: executed commands are streamed to the client, which may still send requests
/// (usually QUIT).
async fn monitor(
    conn: &mut Connection,
    session: &mut Session,
    dispatcher: &Dispatcher,
    mut rx: mpsc::UnboundedReceiver<Frame>,
) -> Result<(), Error> {
    info!("Entered monitor mode");

    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => conn.write_frame(line).await?,
                None => return Ok(()),
            },
            frame = conn.read_frame() => match frame {
                Ok(Some(frame)) => {
                    let reply = dispatcher.dispatch(frame, session).await;
                    conn.write_frame(reply).await?;
                    if session.quit {
                        return Ok(());
                    }
                }
                Ok(None) => return Ok(()),
                Err(err) => return reply_protocol_error(conn, err).await,
            },
        }

        record_traffic(conn, session);
    }
}

/// Answers a malformed request and ends the connection. Any other read failure is returned.
async fn reply_protocol_error(conn: &mut Connection, err: Error) -> Result<(), Error> {
    if err.downcast_ref::<frame::Error>().is_none() {
        return Err(err);
    }

    debug!(error = %err, "Protocol error");
    conn.write_frame(Frame::Error(format!("ERR {}", err))).await
}

fn record_traffic(conn: &Connection, session: &mut Session) {
    session.bytes_read = conn.bytes_read();
    session.bytes_written = conn.bytes_written();
}
