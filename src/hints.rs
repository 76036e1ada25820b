//! Root hints, the servers every resolution starts from.

use crate::errors::Error;
use regex::Regex;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

/// The IPv4 addresses of the root servers, A through M, as published by IANA
/// in <https://www.internic.net/domain/named.root>.
pub const ROOT_SERVERS: [Ipv4Addr; 13] = [
    Ipv4Addr::new(198, 41, 0, 4),     // a.root-servers.net
    Ipv4Addr::new(170, 247, 170, 2),  // b.root-servers.net
    Ipv4Addr::new(192, 33, 4, 12),    // c.root-servers.net
    Ipv4Addr::new(199, 7, 91, 13),    // d.root-servers.net
    Ipv4Addr::new(192, 203, 230, 10), // e.root-servers.net
    Ipv4Addr::new(192, 5, 5, 241),    // f.root-servers.net
    Ipv4Addr::new(192, 112, 36, 4),   // g.root-servers.net
    Ipv4Addr::new(198, 97, 190, 53),  // h.root-servers.net
    Ipv4Addr::new(192, 36, 148, 17),  // i.root-servers.net
    Ipv4Addr::new(192, 58, 128, 30),  // j.root-servers.net
    Ipv4Addr::new(193, 0, 14, 129),   // k.root-servers.net
    Ipv4Addr::new(199, 7, 83, 42),    // l.root-servers.net
    Ipv4Addr::new(202, 12, 27, 33),   // m.root-servers.net
];

lazy_static! {
    // name  ttl  [IN]  A  address
    static ref A_RECORD: Regex =
        Regex::new(r"(?i)^(\S+)\s+(\d+)\s+(?:IN\s+)?A\s+(\S+)$").unwrap();
}

/// Extracts the IPv4 address of every A record in a zone style hints file,
/// in the order they appear.
///
/// Everything after a `;` is a comment. Lines holding other record types
/// (the NS and AAAA records of a standard `named.root`) are skipped.
///
/// ```rust
/// let hints = walkdns::hints::parse("
///     .                     3600000      NS    A.ROOT-SERVERS.NET.
///     A.ROOT-SERVERS.NET.   3600000      A     198.41.0.4
///     A.ROOT-SERVERS.NET.   3600000      AAAA  2001:503:ba3e::2:30
/// ").unwrap();
///
/// assert_eq!(hints, vec!["198.41.0.4".parse::<std::net::Ipv4Addr>().unwrap()]);
/// ```
pub fn parse(input: &str) -> Result<Vec<Ipv4Addr>, Error> {
    let mut servers = Vec::new();

    for (n, line) in input.lines().enumerate() {
        let line = match line.find(';') {
            Some(i) => &line[..i],
            None => line,
        };

        let caps = match A_RECORD.captures(line.trim()) {
            Some(caps) => caps,
            None => continue,
        };

        match caps[3].parse::<Ipv4Addr>() {
            Ok(ip) => servers.push(ip),
            Err(e) => {
                return Err(Error::InvalidHints(format!(
                    "line {}: '{}' {}",
                    n + 1,
                    &caps[3],
                    e
                )))
            }
        }
    }

    if servers.is_empty() {
        return Err(Error::InvalidHints("no A records found".to_string()));
    }

    Ok(servers)
}

/// Reads and parses a hints file, such as `named.root`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Ipv4Addr>, Error> {
    let input = fs::read_to_string(path.as_ref())?;

    parse(&input).map_err(|e| match e {
        Error::InvalidHints(msg) => {
            Error::InvalidHints(format!("{}: {}", path.as_ref().display(), msg))
        }
        e => e,
    })
}
