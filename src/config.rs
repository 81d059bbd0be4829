use clap::Parser;
use tracing::Level;

use crate::codec::DEFAULT_MAX_FRAME_SIZE;

const PORT: u16 = 6379;
const DATABASES: usize = 16;

/// Server configuration. Every flag can also be provided through its environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "modis", version, about)]
pub struct Config {
    /// The address to bind to
    #[arg(long, env = "MODIS_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// The port to listen on
    #[arg(short, long, env = "MODIS_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Password clients must send with AUTH before running any other command
    #[arg(long, env = "MODIS_PASSWORD")]
    pub password: Option<String>,

    /// Number of logical databases
    #[arg(long, env = "MODIS_DATABASES", default_value_t = DATABASES)]
    pub databases: usize,

    /// Backend namespace every logical database lives in
    #[arg(long, env = "MODIS_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Maximum size in bytes of a buffered request
    #[arg(long, env = "MODIS_MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Maximum log level
    #[arg(long, env = "MODIS_LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: PORT,
            password: None,
            databases: DATABASES,
            namespace: "default".to_string(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            log_level: Level::INFO,
        }
    }
}
