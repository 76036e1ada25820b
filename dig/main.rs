// Simple client for a running resolver.
// dig {resolver_ip} {resolver_port} {name} {timeout} {type}
mod util;

use clap::Parser;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use walkdns::clients::UdpClient;
use walkdns::{Error, Message, Question, Resource, Type};

#[derive(Parser, Debug)]
#[clap(name = "dig", about = "Ask a walkdns resolver a single question")]
struct Args {
    /// IPv4 address of the resolver
    resolver_ip: Ipv4Addr,

    /// Port the resolver listens on
    #[clap(value_parser = clap::value_parser!(u16).range(1..))]
    resolver_port: u16,

    /// The name to look up. For PTR queries this may be an IPv4 address.
    name: String,

    /// Seconds to wait for the resolver
    #[clap(value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// One of A, NS, MX, PTR or CNAME
    r#type: Type,

    /// Dump the query and response
    #[clap(long)]
    debug: bool,
}

/// Turns the name given on the command line into the name to query.
fn query_name(name: &str, r#type: Type) -> Result<String, String> {
    if r#type == Type::PTR {
        if let Ok(ip) = name.parse::<Ipv4Addr>() {
            return Ok(Question::reverse(ip));
        }
    }

    idna::domain_to_ascii(name).map_err(|e| format!("invalid name '{}': {:?}", name, e))
}

/// The lines printed for a successful response.
fn answer_lines(response: &Message) -> Result<Vec<String>, Error> {
    response.check_response()?;

    let yes_no = |b| if b { "Yes" } else { "No" };

    let mut lines = vec![
        format!("Is response authoritative? {}", yes_no(response.header.aa)),
        format!("Is response truncated? {}", yes_no(response.header.tc)),
        "Answers: ".to_string(),
    ];

    for resource in response.matching_answers()? {
        lines.push(match resource {
            Resource::MX(mx) => format!(
                "Preference value = {}. Mailserver = {}",
                mx.preference, mx.exchange
            ),
            resource => resource.to_string(),
        });
    }

    Ok(lines)
}

fn run(args: &Args) -> Result<(), Error> {
    let name = match query_name(&args.name, args.r#type) {
        Ok(name) => name,
        Err(e) => return Err(Error::InvalidName(e)),
    };

    let timeout = Duration::from_secs(args.timeout);
    let query = Message::query(&name, args.r#type);

    if args.debug {
        println!("query:");
        util::hexdump(&query.to_vec()?);
        println!();
        println!("{}", query);
    }

    let server = SocketAddr::new(args.resolver_ip.into(), args.resolver_port);
    let (response, stats) = match UdpClient::new(server, timeout)?.query(&query) {
        Err(Error::Timeout) => {
            println!("Error: Timeout reached while waiting for resolver's response.");
            println!("Timeout = {}s.", args.timeout);
            process::exit(1);
        }
        result => result?,
    };

    if args.debug {
        println!("response:");
        util::hexdump(&response.to_vec()?);
        println!();
        println!("{}", response);
        println!("{}", stats);
    }

    for line in answer_lines(&response)? {
        println!("{}", line);
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
