use std::net::{IpAddr, SocketAddr};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://takehome.db?mode=rwc";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter from `RUST_LOG`, or `info` when it is unset or does not parse.
pub fn log_filter() -> EnvFilter {
    log_filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

pub fn log_filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[derive(Parser, Debug)]
#[command(
    name = "takehome",
    about = "Take-home pay, loan and budget planning API",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0", env = "TAKEHOME_HOST")]
    pub host: String,

    #[arg(short, long, default_value_t = 8080, env = "TAKEHOME_PORT")]
    pub port: u16,

    /// SQLite connection string for saved budgets
    #[arg(long, default_value = DEFAULT_DATABASE_URL, env = "TAKEHOME_DATABASE_URL")]
    pub database_url: String,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            Error::Config(format!("--host {:?} is not an IP address: {e}", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    fn parse(args: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(args).expect("valid args");
        let Command::Serve(serve) = cli.command;
        serve
    }

    #[test]
    fn serve_uses_defaults() {
        let serve = parse(&["takehome", "serve"]);
        assert_eq!(serve.port, 8080);
        assert_eq!(serve.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(
            serve.socket_addr().expect("addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
    }

    #[test]
    fn serve_accepts_overrides() {
        let serve = parse(&[
            "takehome",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--database-url",
            "sqlite::memory:",
        ]);
        assert_eq!(serve.socket_addr().expect("addr").to_string(), "127.0.0.1:9000");
        assert_eq!(serve.database_url, "sqlite::memory:");
    }

    #[test]
    fn bad_host_is_a_config_error() {
        let serve = parse(&["takehome", "serve", "--host", "not-an-ip"]);
        assert!(matches!(serve.socket_addr(), Err(Error::Config(_))));
    }

    #[test]
    fn log_filter_honors_rust_log_level() {
        assert_eq!(
            log_filter_from(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(log_filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["takehome"]).is_err());
    }
}
