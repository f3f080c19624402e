use clap::{Parser, ValueEnum};
use qrbridge_telemetry::{LogFormat, OtlpProtocol};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "QRBRIDGE_LISTEN_ADDR";
pub const DOMAIN_ENV: &str = "QRBRIDGE_DOMAIN";
pub const STORAGE_BACKEND_ENV: &str = "QRBRIDGE_STORAGE_BACKEND";
pub const DATABASE_URL_ENV: &str = "QRBRIDGE_DATABASE_URL";
pub const MAX_CONNECTIONS_ENV: &str = "QRBRIDGE_MAX_CONNECTIONS";
pub const OBJECT_STORE_ENV: &str = "QRBRIDGE_OBJECT_STORE";
pub const ASSETS_DIR_ENV: &str = "QRBRIDGE_ASSETS_DIR";
pub const GENERATOR_ENV: &str = "QRBRIDGE_GENERATOR";
pub const GENERATOR_PREFIX_ENV: &str = "QRBRIDGE_GENERATOR_PREFIX";
pub const LINK_LENGTH_ENV: &str = "QRBRIDGE_LINK_LENGTH";
pub const MAX_LINK_ATTEMPTS_ENV: &str = "QRBRIDGE_MAX_LINK_ATTEMPTS";
pub const KEEP_ALIVE_INTERVAL_ENV: &str = "QRBRIDGE_KEEP_ALIVE_INTERVAL_SECS";
pub const DEFAULT_LOGO_ENV: &str = "QRBRIDGE_DEFAULT_LOGO";
pub const LOG_FORMAT_ENV: &str = "QRBRIDGE_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "QRBRIDGE_OTLP_ENDPOINT";
pub const OTLP_PROTOCOL_ENV: &str = "QRBRIDGE_OTLP_PROTOCOL";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DOMAIN: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ASSETS_DIR: &str = "./assets";
pub const DEFAULT_GENERATOR_PREFIX: &str = "qr";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "postgres")]
    Postgres,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ObjectStoreArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "local")]
    Local,
}

impl Display for ObjectStoreArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectStoreArg::InMemory => write!(f, "in-memory"),
            ObjectStoreArg::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorArg {
    /// Random base-36 links.
    #[value(name = "random")]
    Random,
    /// Sequential links, continuing after the highest one already stored.
    #[value(name = "seq")]
    Seq,
}

impl Display for GeneratorArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorArg::Random => write!(f, "random"),
            GeneratorArg::Seq => write!(f, "seq"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "qrbridge-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public origin encoded into QR codes and asset URLs.
    #[arg(long, env = DOMAIN_ENV, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DATABASE_URL_ENV, required_if_eq("storage", "postgres"))]
    pub database_url: Option<String>,

    #[arg(long, env = MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub max_connections: u32,

    #[arg(
        long,
        env = OBJECT_STORE_ENV,
        value_enum,
        default_value_t = ObjectStoreArg::InMemory
    )]
    pub object_store: ObjectStoreArg,

    #[arg(long, env = ASSETS_DIR_ENV, default_value = DEFAULT_ASSETS_DIR)]
    pub assets_dir: PathBuf,

    #[arg(
        long,
        env = GENERATOR_ENV,
        value_enum,
        default_value_t = GeneratorArg::Random
    )]
    pub generator: GeneratorArg,

    #[arg(long, env = GENERATOR_PREFIX_ENV, default_value = DEFAULT_GENERATOR_PREFIX)]
    pub generator_prefix: String,

    #[arg(long, env = LINK_LENGTH_ENV, default_value_t = 12)]
    pub link_length: usize,

    #[arg(long, env = MAX_LINK_ATTEMPTS_ENV, default_value_t = 5)]
    pub max_link_attempts: usize,

    /// Run the keep-alive probe in-process every this many seconds.
    #[arg(long, env = KEEP_ALIVE_INTERVAL_ENV)]
    pub keep_alive_interval: Option<u64>,

    /// PNG or JPEG drawn into codes whose group has no image.
    #[arg(long, env = DEFAULT_LOGO_ENV)]
    pub default_logo: Option<PathBuf>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,

    #[arg(
        long,
        env = OTLP_PROTOCOL_ENV,
        value_enum,
        default_value_t = OtlpProtocol::Grpc
    )]
    pub otlp_protocol: OtlpProtocol,
}

impl CLI {
    /// Base URL of served assets, `{domain}/assets`.
    pub fn assets_base_url(&self) -> String {
        format!("{}/assets", self.domain.trim_end_matches('/'))
    }
}
