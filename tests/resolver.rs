use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::time::Duration;
use walkdns::clients::{Config, Exchanger, Resolver};
use walkdns::name::write_name;
use walkdns::types::*;
use walkdns::{Error, Message};

/// What a scripted server does when asked a question.
#[derive(Clone)]
enum Reply {
    Respond {
        rcode: Rcode,
        answers: Vec<Record>,
        authorities: Vec<Record>,
        additionals: Vec<Record>,
    },
    Garbage(Vec<u8>),
}

/// An in memory network. Any question not in the script times out.
#[derive(Default)]
struct MockExchanger {
    script: HashMap<(Ipv4Addr, String), Reply>,

    /// Every (server, qname) asked, in order.
    contacts: RefCell<Vec<(Ipv4Addr, String)>>,
}

const ANY: &str = "*";

impl MockExchanger {
    fn on(&mut self, server: &str, qname: &str, reply: Reply) -> &mut Self {
        self.script
            .insert((server.parse().unwrap(), qname.to_string()), reply);
        self
    }

    fn contacts(&self) -> Vec<(String, String)> {
        self.contacts
            .borrow()
            .iter()
            .map(|(ip, name)| (ip.to_string(), name.clone()))
            .collect()
    }
}

impl Exchanger for MockExchanger {
    fn exchange(
        &self,
        server: SocketAddr,
        query: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        assert_eq!(server.port(), 53);

        let ip = match server {
            SocketAddr::V4(addr) => *addr.ip(),
            SocketAddr::V6(_) => panic!("unexpected IPv6 server {}", server),
        };

        let query = Message::from_slice(query).expect("resolver sent a bad query");
        let qname = query.questions[0].name.clone();
        self.contacts.borrow_mut().push((ip, qname.clone()));

        let reply = self
            .script
            .get(&(ip, qname))
            .or_else(|| self.script.get(&(ip, ANY.to_string())));

        match reply {
            None => Err(Error::Timeout),
            Some(Reply::Garbage(bytes)) => Ok(bytes.clone()),
            Some(Reply::Respond {
                rcode,
                answers,
                authorities,
                additionals,
            }) => {
                let mut resp = query.clone();
                resp.header.qr = QR::Response;
                resp.header.rcode = *rcode;
                resp.answers = answers.clone();
                resp.authorities = authorities.clone();
                resp.additionals = additionals.clone();
                resp.to_vec()
            }
        }
    }
}

fn encode(name: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    write_name(&mut buf, name).unwrap();
    buf
}

fn record(r#type: Type, rdata: Vec<u8>) -> Record {
    Record {
        // Points at the question name.
        name: vec![0xc0, 0x0c],
        r#type: r#type as u16,
        class: Class::Internet as u16,
        ttl: 300,
        rdata,
    }
}

fn a(ip: &str) -> Record {
    let ip: Ipv4Addr = ip.parse().unwrap();
    record(Type::A, ip.octets().to_vec())
}

fn ns(name: &str) -> Record {
    record(Type::NS, encode(name))
}

fn cname(name: &str) -> Record {
    record(Type::CNAME, encode(name))
}

fn answer(answers: Vec<Record>) -> Reply {
    Reply::Respond {
        rcode: Rcode::NoError,
        answers,
        authorities: vec![],
        additionals: vec![],
    }
}

fn referral(nameservers: &[&str], glue: &[&str]) -> Reply {
    Reply::Respond {
        rcode: Rcode::NoError,
        answers: vec![],
        authorities: nameservers.iter().map(|n| ns(n)).collect(),
        additionals: glue.iter().map(|ip| a(ip)).collect(),
    }
}

fn rcode(rcode: Rcode) -> Reply {
    Reply::Respond {
        rcode,
        answers: vec![],
        authorities: vec![],
        additionals: vec![],
    }
}

fn config(roots: &[&str]) -> Config {
    Config {
        root_hints: roots.iter().map(|ip| ip.parse().unwrap()).collect(),
        timeout: Duration::from_secs(1),
        ..Default::default()
    }
}

fn contacts(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(ip, name)| (ip.to_string(), name.to_string()))
        .collect()
}

fn assert_no_answer(query: &Message, resp: &Message) {
    assert_eq!(resp.header.id, query.header.id);
    assert_eq!(resp.header.qr, QR::Response);
    assert_eq!(resp.header.rcode, Rcode::NoError);
    assert!(resp.answers.is_empty());
    assert_eq!(resp.questions, query.questions);
}

#[test]
fn test_end_to_end() {
    let mut mock = MockExchanger::default();
    mock.on(
        "198.41.0.4",
        "example.com",
        referral(&["a.gtld-servers.net"], &["192.5.6.30"]),
    )
    .on(
        "192.5.6.30",
        "example.com",
        referral(&["a.iana-servers.net"], &["199.43.135.53"]),
    )
    .on("199.43.135.53", "example.com", answer(vec![a("93.184.216.34")]));

    let resolver = Resolver::new_with_client(&mock, config(&["198.41.0.4"]));
    let query = Message::query("example.com", Type::A);
    let resp = resolver.resolve(&query).unwrap();

    assert_eq!(
        mock.contacts(),
        contacts(&[
            ("198.41.0.4", "example.com"),
            ("192.5.6.30", "example.com"),
            ("199.43.135.53", "example.com"),
        ])
    );

    assert_eq!(resp.header.rcode, Rcode::NoError);
    assert_eq!(resp.answers.len(), 1);
    assert_eq!(
        resp.answers[0].ipv4(),
        Some(Ipv4Addr::new(93, 184, 216, 34))
    );
}

#[test]
fn test_referral_order() {
    let mut mock = MockExchanger::default();
    mock.on(
        "198.41.0.4",
        "example.com",
        referral(&[], &["10.0.0.1", "10.0.0.2", "10.0.0.3"]),
    );

    let resolver = Resolver::new_with_client(&mock, config(&["198.41.0.4"]));
    let query = Message::query("example.com", Type::A);
    let resp = resolver.resolve(&query).unwrap();

    // Most recently pushed first, and nobody is asked twice.
    assert_eq!(
        mock.contacts(),
        contacts(&[
            ("198.41.0.4", "example.com"),
            ("10.0.0.3", "example.com"),
            ("10.0.0.2", "example.com"),
            ("10.0.0.1", "example.com"),
        ])
    );
    assert_no_answer(&query, &resp);
}

#[test]
fn test_exhausted() {
    let roots = ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4", "10.0.0.5"];
    let mock = MockExchanger::default();

    let resolver = Resolver::new_with_client(&mock, config(&roots));
    let query = Message::query("example.com", Type::A);
    let resp = resolver.resolve(&query).unwrap();

    // The last root hint is tried first.
    assert_eq!(
        mock.contacts(),
        contacts(&[
            ("10.0.0.5", "example.com"),
            ("10.0.0.4", "example.com"),
            ("10.0.0.3", "example.com"),
            ("10.0.0.2", "example.com"),
            ("10.0.0.1", "example.com"),
        ])
    );
    assert_no_answer(&query, &resp);
}

#[test]
fn test_cname_restart() {
    let mut mock = MockExchanger::default();
    mock.on(
        "198.41.0.4",
        "www.example.com",
        answer(vec![cname("cdn.example.net")]),
    )
    .on(
        "198.41.0.4",
        "cdn.example.net",
        answer(vec![a("10.1.1.1")]),
    );

    let resolver = Resolver::new_with_client(&mock, config(&["198.41.0.4"]));
    let query = Message::query("www.example.com", Type::A);
    let resp = resolver.resolve(&query).unwrap();

    assert_eq!(
        mock.contacts(),
        contacts(&[
            ("198.41.0.4", "www.example.com"),
            ("198.41.0.4", "cdn.example.net"),
        ])
    );

    assert_eq!(resp.questions[0].name, "cdn.example.net");
    assert_eq!(
        resp.matching_answers().unwrap(),
        vec![Resource::A(Ipv4Addr::new(10, 1, 1, 1))]
    );
}

#[test]
fn test_cname_only_for_a() {
    let mut mock = MockExchanger::default();
    mock.on(
        "198.41.0.4",
        "www.example.com",
        answer(vec![cname("cdn.example.net")]),
    );

    let resolver = Resolver::new_with_client(&mock, config(&["198.41.0.4"]));
    let query = Message::query("www.example.com", Type::MX);
    let resp = resolver.resolve(&query).unwrap();

    assert_eq!(
        mock.contacts(),
        contacts(&[("198.41.0.4", "www.example.com")])
    );
    assert_no_answer(&query, &resp);
}

#[test]
fn test_servfail_skips_server() {
    let mut mock = MockExchanger::default();
    mock.on("10.0.0.2", "example.com", rcode(Rcode::ServFail))
        .on("10.0.0.1", "example.com", answer(vec![a("10.1.1.1")]));

    let resolver = Resolver::new_with_client(&mock, config(&["10.0.0.1", "10.0.0.2"]));
    let resp = resolver
        .resolve(&Message::query("example.com", Type::A))
        .unwrap();

    assert_eq!(mock.contacts().len(), 2);
    assert_eq!(resp.answers.len(), 1);
}

#[test]
fn test_nxdomain_returned_verbatim() {
    let mut mock = MockExchanger::default();
    mock.on("10.0.0.2", "nope.example.com", rcode(Rcode::NXDomain))
        .on("10.0.0.1", "nope.example.com", answer(vec![a("10.1.1.1")]));

    let resolver = Resolver::new_with_client(&mock, config(&["10.0.0.1", "10.0.0.2"]));
    let query = Message::query("nope.example.com", Type::A);
    let resp = resolver.resolve(&query).unwrap();

    assert_eq!(
        mock.contacts(),
        contacts(&[("10.0.0.2", "nope.example.com")])
    );
    assert_eq!(resp.header.rcode, Rcode::NXDomain);
    assert!(matches!(resp.check_response(), Err(Error::NameNotFound(name)) if name == "nope.example.com"));
}

#[test]
fn test_unassigned_rcode_returned_verbatim() {
    let mut mock = MockExchanger::default();
    mock.on("10.0.0.2", "example.com", rcode(Rcode::Reserved(12)))
        .on("10.0.0.1", "example.com", answer(vec![a("10.1.1.1")]));

    let resolver = Resolver::new_with_client(&mock, config(&["10.0.0.1", "10.0.0.2"]));
    let resp = resolver
        .resolve(&Message::query("example.com", Type::A))
        .unwrap();

    assert_eq!(mock.contacts(), contacts(&[("10.0.0.2", "example.com")]));
    assert_eq!(resp.header.rcode, Rcode::Reserved(12));
    match resp.check_response() {
        Err(e) => assert_eq!(e.to_string(), "not a valid response: RCODE = 12"),
        Ok(()) => panic!("expected an error"),
    }
}

#[test]
fn test_malformed_response_skips_server() {
    let mut mock = MockExchanger::default();
    mock.on("10.0.0.2", "example.com", Reply::Garbage(vec![0x12, 0x34, 0x81]))
        .on("10.0.0.1", "example.com", answer(vec![a("10.1.1.1")]));

    let resolver = Resolver::new_with_client(&mock, config(&["10.0.0.1", "10.0.0.2"]));
    let resp = resolver
        .resolve(&Message::query("example.com", Type::A))
        .unwrap();

    assert_eq!(mock.contacts().len(), 2);
    assert_eq!(resp.answers.len(), 1);
}

#[test]
fn test_authority_fallback() {
    let mut mock = MockExchanger::default();
    mock.on(
        "198.41.0.4",
        "www.example.com",
        referral(&["ns1.example.org"], &[]),
    )
    .on(
        "198.41.0.4",
        "ns1.example.org",
        answer(vec![a("10.9.9.9")]),
    )
    .on("10.9.9.9", "www.example.com", answer(vec![a("10.1.1.1")]));

    let resolver = Resolver::new_with_client(&mock, config(&["198.41.0.4"]));
    let resp = resolver
        .resolve(&Message::query("www.example.com", Type::A))
        .unwrap();

    assert_eq!(
        mock.contacts(),
        contacts(&[
            ("198.41.0.4", "www.example.com"),
            ("198.41.0.4", "ns1.example.org"),
            ("10.9.9.9", "www.example.com"),
        ])
    );
    assert_eq!(resp.answers[0].ipv4(), Some(Ipv4Addr::new(10, 1, 1, 1)));
}

#[test]
fn test_too_many_restarts() {
    let mut mock = MockExchanger::default();
    mock.on("10.0.0.1", "a.example", answer(vec![cname("b.example")]))
        .on("10.0.0.1", "b.example", answer(vec![cname("a.example")]));

    let resolver = Resolver::new_with_client(
        &mock,
        Config {
            max_restarts: 3,
            ..config(&["10.0.0.1"])
        },
    );

    assert!(matches!(
        resolver.resolve(&Message::query("a.example", Type::A)),
        Err(Error::TooManyRestarts(3))
    ));
    // The first walk, then one per restart.
    assert_eq!(mock.contacts().len(), 4);
}

#[test]
fn test_too_deep() {
    // Every nameserver lives under a zone it serves itself, without glue.
    let mut mock = MockExchanger::default();
    mock.on("10.0.0.1", ANY, referral(&["ns.loop.example"], &[]));

    let resolver = Resolver::new_with_client(
        &mock,
        Config {
            max_depth: 2,
            ..config(&["10.0.0.1"])
        },
    );

    assert!(matches!(
        resolver.resolve(&Message::query("www.loop.example", Type::A)),
        Err(Error::TooDeep(2))
    ));
    assert_eq!(
        mock.contacts(),
        contacts(&[
            ("10.0.0.1", "www.loop.example"),
            ("10.0.0.1", "ns.loop.example"),
            ("10.0.0.1", "ns.loop.example"),
        ])
    );
}

#[test]
fn test_budget_exhausted() {
    let mock = MockExchanger::default();
    let resolver = Resolver::new_with_client(
        &mock,
        Config {
            budget: Some(Duration::from_secs(0)),
            ..config(&["10.0.0.1"])
        },
    );

    assert!(matches!(
        resolver.resolve(&Message::query("example.com", Type::A)),
        Err(Error::BudgetExhausted(_))
    ));
    assert!(mock.contacts().is_empty());
}

#[test]
fn test_no_question() {
    let mock = MockExchanger::default();
    let resolver = Resolver::new_with_client(&mock, config(&["10.0.0.1"]));

    let mut query = Message::query("example.com", Type::A);
    query.questions.clear();

    assert!(matches!(
        resolver.resolve(&query),
        Err(Error::InvalidQuery(_))
    ));
}

#[test]
fn test_answer_keeps_client_id() {
    let mut mock = MockExchanger::default();
    mock.on(
        "198.41.0.4",
        "www.example.com",
        answer(vec![cname("cdn.example.net")]),
    )
    .on(
        "198.41.0.4",
        "cdn.example.net",
        answer(vec![a("10.1.1.1")]),
    );

    let resolver = Resolver::new_with_client(&mock, config(&["198.41.0.4"]));

    let mut query = Message::query("www.example.com", Type::A);
    query.header.id = 0x4242;

    let reply = resolver.answer(&query.to_vec().unwrap()).unwrap();
    let reply = Message::from_slice(&reply).unwrap();

    assert_eq!(reply.header.id, 0x4242);
    assert_eq!(reply.header.qr, QR::Response);
    assert_eq!(reply.answers[0].ipv4(), Some(Ipv4Addr::new(10, 1, 1, 1)));
}
