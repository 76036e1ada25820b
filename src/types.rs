use crate::resource::MX;
use bytes::Bytes;
use std::net::Ipv4Addr;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// DNS Message that serves as the root of all DNS requests and responses.
///
/// A message is either built fresh (see [`Message::query`]) or parsed from a
/// received datagram with [`Message::from_slice`]. A parsed message keeps the
/// datagram it came from, so that compression pointers inside record names and
/// rdata can be resolved against the bytes exactly as they were transmitted.
///
/// # Examples
///
/// ```rust
/// use walkdns::{Message, Type};
///
/// let query = Message::query("example.com", Type::A);
/// let wire = query.to_vec().expect("failed to encode DNS query");
///
/// let parsed = Message::from_slice(&wire).expect("invalid message");
/// assert_eq!(parsed.questions[0].name, "example.com");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Message {
    pub header: Header,

    /// The questions. In practice always exactly one.
    pub questions: Vec<Question>,

    /// The answer records.
    pub answers: Vec<Record>,

    /// The authority records.
    pub authorities: Vec<Record>,

    /// The additional records.
    pub additionals: Vec<Record>,

    /// The datagram this message was parsed from, if any.
    pub(crate) wire: Option<Bytes>,
}

/// The fixed fields of the 12 byte message header.
///
/// The four section counts are not stored here. They are read into a
/// [`Counts`] while parsing, and derived from the live section lengths when
/// the message is written out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    /// 16-bit identifier assigned by the program that generates any kind of
    /// query. This identifier is copied into the corresponding reply.
    pub id: u16,

    /// Specifies whether this message is a query (0), or a response (1).
    pub qr: QR,

    /// Specifies kind of query in this message. 0 represents a standard query.
    pub opcode: Opcode,

    /// Authoritative Answer - Specifies that the responding name server is an
    /// authority for the domain name in question section.
    pub aa: bool,

    /// Truncation - specifies that this message was truncated.
    pub tc: bool,

    /// Recursion Desired - this bit directs the name server to pursue the query
    /// recursively.
    pub rd: bool,

    /// Recursion Available - this be is set or cleared in a response, and
    /// denotes whether recursive query support is available in the name server.
    pub ra: bool,

    /// Response code.
    pub rcode: Rcode,
}

/// The QDCOUNT, ANCOUNT, NSCOUNT and ARCOUNT header fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Counts {
    pub questions: u16,
    pub answers: u16,
    pub authorities: u16,
    pub additionals: u16,
}

/// DNS Question.
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    /// The canonical name: dot separated labels, without the trailing dot.
    pub name: String,

    /// The raw QTYPE. See [`Type`] for the ones this crate understands.
    pub r#type: u16,

    /// The raw QCLASS. Always [`Class::Internet`] for queries built here.
    pub class: u16,
}

/// Resource Record (RR)
///
/// The record is kept close to its wire form. The name is the raw encoded
/// name field as it appeared in the datagram (labels, a pointer, or labels
/// ending in a pointer) and the rdata is opaque. Both are written back out
/// verbatim. Use [`Message::domain`] and [`Message::resource`] to interpret
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The encoded name field, not decompressed.
    pub name: Vec<u8>,

    pub r#type: u16,
    pub class: u16,

    /// The number of seconds that the resource record may be cached
    /// before the source of the information should again be consulted.
    pub ttl: u32,

    pub rdata: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumString, PartialEq)]
pub enum QR {
    Query = 0,
    Response = 1,
}

impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Specifies kind of query in this message. See [rfc1035], [rfc6895] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
///
/// Every 4 bit value decodes; unassigned ones are kept as [`Opcode::Reserved`].
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
#[derive(Copy, Clone, Debug, EnumString, IntoStaticStr, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Opcode {
    /// Query.
    Query,

    /// Inverse Query (OBSOLETE). See [rfc3425].
    ///
    /// [rfc3425]: https://datatracker.ietf.org/doc/html/rfc3425
    IQuery,
    Status,

    /// See [rfc1996]
    ///
    /// [rfc1996]: https://datatracker.ietf.org/doc/html/rfc1996
    Notify,

    /// See [rfc2136]
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    Update,

    /// DNS Stateful Operations (DSO). See [rfc8490]
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSO,

    /// 3 and 7-15 remain unassigned.
    Reserved(u8),
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

impl Opcode {
    /// Decodes the low 4 bits of `b`.
    pub fn from_u8(b: u8) -> Opcode {
        match b & 0x0F {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            6 => Opcode::DSO,
            b => Opcode::Reserved(b),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::DSO => 6,
            Opcode::Reserved(b) => b & 0x0F,
        }
    }
}

/// Response Codes.
/// See [rfc1035] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6>
///
/// Like [`Opcode`], every 4 bit value decodes.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Copy, Clone, Debug, EnumString, IntoStaticStr, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rcode {
    /// No Error
    NoError,

    /// Format Error
    FormErr,

    /// Server Failure
    ServFail,

    /// Non-Existent Domain
    NXDomain,

    /// Not Implemented
    NotImp,

    /// Query Refused
    Refused,

    /// Name Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXDomain,

    /// RR Set Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXRRSet,

    /// RR Set that should exist does not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NXRRSet,

    /// Not Authoritative [rfc2136] or Not Authorized [rfc2845].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    /// [rfc2845]: https://datatracker.ietf.org/doc/html/rfc2845
    NotAuth,

    /// Name not contained in zone. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NotZone,

    /// DSO-TYPE Not Implemented. See [rfc8490].
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSOTYPENI,

    /// 12-15 are unassigned.
    Reserved(u8),
}

impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

impl Rcode {
    /// Decodes the low 4 bits of `b`.
    pub fn from_u8(b: u8) -> Rcode {
        match b & 0x0F {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NXDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            6 => Rcode::YXDomain,
            7 => Rcode::YXRRSet,
            8 => Rcode::NXRRSet,
            9 => Rcode::NotAuth,
            10 => Rcode::NotZone,
            11 => Rcode::DSOTYPENI,
            b => Rcode::Reserved(b),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YXDomain => 6,
            Rcode::YXRRSet => 7,
            Rcode::NXRRSet => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::DSOTYPENI => 11,
            Rcode::Reserved(b) => b & 0x0F,
        }
    }
}

/// Resource Record Type, for example, A, CNAME or MX.
///
/// Only the types the resolver and the client interpret are listed. Records
/// of any other type are carried through untouched, see [`Record::kind`].
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
#[strum(ascii_case_insensitive)]
#[repr(u16)]
pub enum Type {
    /// (Default) IPv4 Address.
    A = 1,

    /// Authoritative name server.
    NS = 2,

    /// Canonical name for an alias.
    CNAME = 5,

    /// Domain name pointer.
    PTR = 12,

    /// Mail exchange.
    MX = 15,
}

impl Default for Type {
    fn default() -> Self {
        Type::A
    }
}

/// Resource Record Class, for example Internet.
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq)]
#[repr(u16)]
pub enum Class {
    /// (Default) The Internet (IN), see [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "IN")]
    Internet = 1,

    /// CSNET (CS), obsolete (used only for examples in some obsolete RFCs).
    #[strum(serialize = "CS")]
    CsNet = 2,

    /// Chaosnet (CH), obsolete LAN protocol created at MIT in the mid-1970s.
    #[strum(serialize = "CH")]
    Chaos = 3,

    /// Hesiod (HS), an information service developed by MIT's Project Athena.
    #[strum(serialize = "HS")]
    Hesiod = 4,

    /// * (ANY) See [rfc1035]
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "*")]
    Any = 255,
}

impl Default for Class {
    fn default() -> Self {
        Class::Internet
    }
}

/// The decoded rdata of a record.
// This should be kept in sync with Type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    A(Ipv4Addr),

    NS(String),
    CNAME(String),
    PTR(String),

    MX(MX),

    /// Any type this crate doesn't interpret, with its raw rdata.
    Unknown(u16, Vec<u8>),
}
