use crate::clients::Exchanger;
use crate::hints::ROOT_SERVERS;
use crate::types::*;
use crate::Error;
use crate::Message;
use log::{debug, info, warn};
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::time::Duration;
use std::time::Instant;

cfg_feature! {
    #![feature = "udp"]

    use crate::clients::UdpExchanger;

    impl Resolver<UdpExchanger> {
        /// Creates a new Resolver that contacts servers over UDP.
        pub fn new(config: Config) -> Resolver<UdpExchanger> {
            Resolver::new_with_client(UdpExchanger::new(), config)
        }
    }

    impl Default for Resolver<UdpExchanger> {
        fn default() -> Self {
            Self::new(Config::default())
        }
    }
}

/// Knobs for the [`Resolver`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Servers every resolution starts from. The last one is tried first.
    pub root_hints: Vec<Ipv4Addr>,

    /// How long to wait for each server to answer.
    pub timeout: Duration,

    /// Port the upstream servers listen on.
    pub port: u16,

    /// How many CNAMEs to follow before giving up.
    pub max_restarts: usize,

    /// How deeply nameserver lookups may nest.
    pub max_depth: usize,

    /// Optional limit on the total time a single resolution may take.
    pub budget: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_hints: ROOT_SERVERS.to_vec(),
            timeout: Duration::from_secs(5),
            port: 53,
            max_restarts: 8,
            max_depth: 4,
            budget: None,
        }
    }
}

/// An iterative resolver. Starting at the root servers, it follows referrals
/// down the hierarchy until some server answers the question itself.
///
/// See [rfc1034#section-5.3.3].
///
/// [rfc1034#section-5.3.3]: https://datatracker.ietf.org/doc/html/rfc1034#section-5.3.3
pub struct Resolver<E> {
    client: E,
    config: Config,
}

/// The servers still to be asked, in the order they will be asked
/// (last pushed, first tried).
#[derive(Debug, Default)]
struct Slist {
    servers: Vec<Ipv4Addr>,
}

impl Slist {
    fn new(seed: &[Ipv4Addr]) -> Slist {
        Slist {
            servers: seed.to_vec(),
        }
    }

    fn push(&mut self, ip: Ipv4Addr) {
        self.servers.push(ip)
    }

    fn pop(&mut self) -> Option<Ipv4Addr> {
        self.servers.pop()
    }

    fn len(&self) -> usize {
        self.servers.len()
    }
}

/// What to do after looking at a response.
#[derive(Debug, PartialEq)]
enum Step {
    /// Move on to the next server.
    Skip,

    /// Hand the response back to the caller.
    Done,

    /// Ask the whole question again, for this name.
    Restart(String),

    /// Ask these servers next.
    Refer(Vec<Ipv4Addr>),

    /// Look up the addresses of these nameservers, then ask them next.
    Delegate(Vec<String>),
}

/// How one walk down from the roots ended.
enum Outcome {
    Answered(Message),
    Restart(String),
}

/// Decides what `response` means for `question`.
///
/// Glue A records whose rdata isn't 4 bytes are dropped before deciding
/// between a referral and an authority lookup, so a response carrying only
/// such glue is treated as having none.
fn classify(question: &Question, response: &Message) -> Result<Step, Error> {
    match response.header.rcode {
        Rcode::NoError => (),
        Rcode::ServFail => return Ok(Step::Skip),
        _ => return Ok(Step::Done),
    }

    if response
        .answers
        .iter()
        .any(|answer| answer.r#type == question.r#type)
    {
        return Ok(Step::Done);
    }

    if question.kind() == Some(Type::A) {
        if let Some(cname) = response
            .answers
            .iter()
            .find(|answer| answer.kind() == Some(Type::CNAME))
        {
            return Ok(Step::Restart(response.domain(&cname.rdata)?));
        }
    }

    // Glue records for the nameservers we are being referred to.
    let glue: Vec<Ipv4Addr> = response.additionals.iter().filter_map(Record::ipv4).collect();
    if !glue.is_empty() {
        return Ok(Step::Refer(glue));
    }

    let nameservers = response
        .authorities
        .iter()
        .filter(|authority| authority.kind() == Some(Type::NS))
        .map(|authority| response.domain(&authority.rdata))
        .collect::<Result<Vec<String>, Error>>()?;

    Ok(Step::Delegate(nameservers))
}

impl<E> Resolver<E>
where
    E: Exchanger,
{
    /// Creates a new Resolver that contacts servers through `client`.
    pub fn new_with_client(client: E, config: Config) -> Resolver<E> {
        Resolver { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves the question in `query`, returning the response of the
    /// server that finally answered it.
    ///
    /// A response with any rcode other than NoError or ServFail is returned
    /// as is. If every server was tried without finding an answer, the query
    /// itself is returned as a response with no answers (see
    /// [`Message::no_answer`]).
    ///
    /// Errors only when one of the configured limits is reached, or the query
    /// can't be sent at all.
    pub fn resolve(&self, query: &Message) -> Result<Message, Error> {
        let deadline = self.config.budget.map(|budget| Instant::now() + budget);
        self.resolve_at(query, 0, deadline)
    }

    fn resolve_at(
        &self,
        query: &Message,
        depth: usize,
        deadline: Option<Instant>,
    ) -> Result<Message, Error> {
        if query.questions.is_empty() {
            return Err(Error::InvalidQuery("no question to resolve".to_string()));
        }

        let mut query = query.clone();
        let mut restarts = 0;

        loop {
            match self.walk(&query, depth, deadline)? {
                Outcome::Answered(response) => return Ok(response),
                Outcome::Restart(name) => {
                    if restarts == self.config.max_restarts {
                        return Err(Error::TooManyRestarts(restarts));
                    }
                    restarts += 1;

                    info!(
                        "{} is an alias for {}, starting again from the roots",
                        query.questions[0].name, name
                    );
                    query = query.with_name(&name);
                }
            }
        }
    }

    /// Walks down from the root servers once.
    fn walk(
        &self,
        query: &Message,
        depth: usize,
        deadline: Option<Instant>,
    ) -> Result<Outcome, Error> {
        let question = &query.questions[0];
        let req = query.to_vec()?;

        let mut slist = Slist::new(&self.config.root_hints);

        while let Some(ip) = slist.pop() {
            let timeout = self.timeout(deadline)?;
            let server = SocketAddr::new(ip.into(), self.config.port);

            debug!(
                "asking {} about {} ({} more queued)",
                server,
                question.name,
                slist.len()
            );

            let resp = match self.client.exchange(server, &req, timeout) {
                Ok(resp) => resp,
                Err(Error::Timeout) => {
                    debug!("{} timed out after {:?}, skipping", server, timeout);
                    continue;
                }
                Err(e) => {
                    warn!("{} failed: {}, skipping", server, e);
                    continue;
                }
            };

            let response = match Message::from_slice(&resp) {
                Ok(response) => response,
                Err(e) => {
                    warn!("{} sent a bad response: {}, skipping", server, e);
                    continue;
                }
            };

            let step = match classify(question, &response) {
                Ok(step) => step,
                Err(e) => {
                    warn!("{} sent a bad response: {}, skipping", server, e);
                    continue;
                }
            };

            debug!("{} replied {}: {:?}", server, response.header.rcode, step);

            match step {
                Step::Skip => continue,
                Step::Done => return Ok(Outcome::Answered(response)),
                Step::Restart(name) => return Ok(Outcome::Restart(name)),
                Step::Refer(glue) => {
                    for ip in glue {
                        slist.push(ip);
                    }
                }
                Step::Delegate(nameservers) => {
                    for ns in nameservers {
                        for ip in self.lookup_nameserver(&ns, depth, deadline)? {
                            slist.push(ip);
                        }
                    }
                }
            }
        }

        debug!("ran out of servers to ask about {}", question.name);
        Ok(Outcome::Answered(query.no_answer()))
    }

    /// Resolves the address of a nameserver that came without glue.
    fn lookup_nameserver(
        &self,
        name: &str,
        depth: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<Ipv4Addr>, Error> {
        if depth == self.config.max_depth {
            return Err(Error::TooDeep(depth));
        }

        info!("resolving nameserver {}", name);

        let response = match self.resolve_at(&Message::query(name, Type::A), depth + 1, deadline) {
            Ok(response) => response,
            Err(e) if e.is_limit() => return Err(e),
            Err(e) => {
                warn!("could not resolve nameserver {}: {}", name, e);
                return Ok(Vec::new());
            }
        };

        let ips: Vec<Ipv4Addr> = response.answers.iter().filter_map(Record::ipv4).collect();
        debug!("nameserver {} is at {:?}", name, ips);

        Ok(ips)
    }

    /// The timeout for the next contact, cut short by the budget if need be.
    fn timeout(&self, deadline: Option<Instant>) -> Result<Duration, Error> {
        let deadline = match deadline {
            Some(deadline) => deadline,
            None => return Ok(self.config.timeout),
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(Error::BudgetExhausted(
                self.config.budget.unwrap_or_default(),
            ));
        }

        Ok(self.config.timeout.min(deadline - now))
    }
}
