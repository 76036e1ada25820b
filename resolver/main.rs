// Iterative resolver service.
// resolver {port} {timeout}
use clap::Parser;
use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tracing_subscriber::EnvFilter;
use walkdns::clients::{Config, Resolver, UdpExchanger};
use walkdns::hints;

/// Largest query accepted from a client.
const MAX_QUERY_SIZE: usize = 512;

#[derive(Parser, Debug)]
#[clap(
    name = "resolver",
    about = "Iterative DNS resolver, walking down from the root servers"
)]
struct Args {
    /// Port to listen for queries on
    #[clap(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Seconds to wait for each upstream server
    #[clap(value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Root hints file (such as named.root) to use instead of the built in list
    #[clap(long, value_name = "FILE")]
    hints: Option<PathBuf>,

    /// Most queries to work on at once
    #[clap(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
    max_inflight: u32,

    /// Seconds a single query may take in total
    #[clap(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    budget: Option<u64>,

    /// Log level (trace, debug, info, warn, error). Overrides RUST_LOG.
    #[clap(long)]
    log_level: Option<String>,
}

#[derive(Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] walkdns::Error),

    #[error("failed to listen on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Args {
    fn config(&self) -> Result<Config, walkdns::Error> {
        let mut config = Config {
            timeout: Duration::from_secs(self.timeout),
            budget: self.budget.map(Duration::from_secs),
            ..Default::default()
        };

        if let Some(path) = &self.hints {
            config.root_hints = hints::load(path)?;
        }

        Ok(config)
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(args: Args) -> Result<(), StartupError> {
    let config = args.config()?;
    info!(
        "starting with {} root servers, {:?} timeout",
        config.root_hints.len(),
        config.timeout
    );

    let resolver: Arc<Resolver<UdpExchanger>> = Arc::new(Resolver::new(config));

    let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], args.port)))
        .await
        .map_err(|source| StartupError::Bind {
            port: args.port,
            source,
        })?;
    let socket = Arc::new(socket);
    info!("listening on {}", socket.local_addr()?);

    let inflight = Arc::new(Semaphore::new(args.max_inflight as usize));
    let mut buf = [0; MAX_QUERY_SIZE];

    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                warn!("failed to receive: {}", e);
                continue;
            }
        };

        // Wait here for a free slot, leaving the rest queued in the socket.
        let permit = match inflight.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("{}", e);
                return Ok(());
            }
        };

        info!("received query from {}", peer);

        let datagram = buf[..len].to_vec();
        let resolver = resolver.clone();
        let socket = socket.clone();

        tokio::spawn(async move {
            let _permit = permit;

            // Resolution blocks on each upstream server in turn.
            let reply = tokio::task::spawn_blocking(move || resolver.answer(&datagram)).await;

            match reply {
                Ok(Ok(reply)) => match socket.send_to(&reply, peer).await {
                    Ok(_) => info!("returned response to {}", peer),
                    Err(e) => warn!("failed to reply to {}: {}", peer, e),
                },
                Ok(Err(e)) => warn!("dropping query from {}: {}", peer, e),
                Err(e) => error!("query from {} did not complete: {}", peer, e),
            }
        });
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    if let Err(e) = serve(args).await {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(&["resolver", "5300", "3", "--budget", "30"]).unwrap();

        assert_eq!(args.port, 5300);
        assert_eq!(args.max_inflight, 64);

        let config = args.config().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.budget, Some(Duration::from_secs(30)));
        assert_eq!(config.port, 53);
        assert_eq!(config.root_hints, hints::ROOT_SERVERS.to_vec());
    }

    #[test]
    fn test_args_invalid() {
        assert!(Args::try_parse_from(&["resolver", "5300", "0"]).is_err());
        assert!(Args::try_parse_from(&["resolver", "0", "5"]).is_err());
        assert!(Args::try_parse_from(&["resolver", "5300"]).is_err());
        assert!(Args::try_parse_from(&["resolver", "5300", "5", "--max-inflight", "0"]).is_err());
    }

    #[test]
    fn test_args_missing_hints() {
        let args =
            Args::try_parse_from(&["resolver", "5300", "5", "--hints", "/nonexistent/named.root"])
                .unwrap();

        assert!(matches!(args.config(), Err(walkdns::Error::Io(_))));
    }
}
