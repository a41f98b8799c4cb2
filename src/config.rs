use clap::Parser;

pub const MEMORY_DATABASE: &str = "memory";

/// Presence-aware chat and call-signaling relay.
///
/// Every option can also come from the environment or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(name = "hugrelay", version, about)]
pub struct Config {
    /// Address the HTTP/WebSocket server listens on
    #[arg(long, short = 'b', env = "HUGRELAY_BIND", default_value = "0.0.0.0:5000")]
    pub bind: String,

    /// SQLite URL for conversation and user documents, or `memory`
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://hugrelay.db?mode=rwc")]
    pub database_url: String,

    /// Size of the SQLite connection pool
    #[arg(long, env = "HUGRELAY_DB_CONNECTIONS", default_value_t = 16)]
    pub max_db_connections: u32,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "HUGRELAY_LOG", default_value = "info")]
    pub log: String,
}

impl Config {
    /// Reads `.env` (if any) and then the command line.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    pub fn in_memory(&self) -> bool {
        self.database_url == MEMORY_DATABASE
    }
}
