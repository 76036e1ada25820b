//! Implements the Display trait for the various types, so they output
//! in `dig` style.
// Refer to https://github.com/tigeli/bind-utils/blob/master/bin/dig/dig.c for reference.

use crate::clients::Stats;
use crate::resource::MX;
use crate::types::{Class, Message, Opcode, Question, Rcode, Record, Resource, Type};
use chrono::prelude::*;
use num_traits::FromPrimitive;
use std::fmt;

/// Writes a type mnemonic, or the RFC 3597 generic form for unknown types.
struct TypeName(u16);

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Type::from_u16(self.0) {
            Some(t) => f.pad(&t.to_string()),
            None => f.pad(&format!("TYPE{}", self.0)),
        }
    }
}

struct ClassName(u16);

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Class::from_u16(self.0) {
            Some(c) => f.pad(&c.to_string()),
            None => f.pad(&format!("CLASS{}", self.0)),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::Reserved(b) => f.pad(&format!("RESERVED{}", b)),
            opcode => {
                let name: &'static str = opcode.into();
                f.pad(name)
            }
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::Reserved(b) => f.pad(&format!("RESERVED{}", b)),
            rcode => {
                let name: &'static str = rcode.into();
                f.pad(name)
            }
        }
    }
}

/// Displays this message in a format resembling `dig` output.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)?;

        // Always display the question section, but optionally
        // display the other sections.
        writeln!(f, ";; QUESTION SECTION:")?;
        for question in &self.questions {
            fmt::Display::fmt(question, f)?;
        }
        writeln!(f)?;

        let sections = [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authorities),
            ("ADDITIONAL", &self.additionals),
        ];

        for (title, records) in sections.iter() {
            if records.is_empty() {
                continue;
            }

            writeln!(f, ";; {} SECTION:", title)?;
            for record in records.iter() {
                self.fmt_record(f, record)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Message {
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let h = &self.header;

        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {opcode}, status: {rcode}, id: {id}",
            opcode = h.opcode,
            rcode = h.rcode,
            id = h.id,
        )?;

        let mut flags = String::new();

        if h.qr.to_bool() {
            flags.push_str(" qr")
        }
        if h.aa {
            flags.push_str(" aa")
        }
        if h.tc {
            flags.push_str(" tc")
        }
        if h.rd {
            flags.push_str(" rd")
        }
        if h.ra {
            flags.push_str(" ra")
        }

        writeln!(f, ";; flags:{flags}; QUERY: {qd_count}, ANSWER: {an_count}, AUTHORITY: {ns_count}, ADDITIONAL: {ar_count}",
            flags = flags,
            qd_count = self.questions.len(),
            an_count = self.answers.len(),
            ns_count = self.authorities.len(),
            ar_count = self.additionals.len(),
        )?;

        writeln!(f)
    }

    /// Records need the message to decompress their names.
    fn fmt_record(&self, f: &mut fmt::Formatter, record: &Record) -> fmt::Result {
        let name = self
            .domain(&record.name)
            .unwrap_or_else(|_| "<invalid>".to_string());

        let resource = match self.resource(record) {
            Ok(resource) => resource.to_string(),
            Err(e) => format!("<{}>", e),
        };

        writeln!(
            f,
            "{name:<20} {ttl:>4} {class:4} {type:6} {resource}",
            name = name,
            ttl = record.ttl,
            class = ClassName(record.class),
            r#type = TypeName(record.r#type),
            resource = resource,
        )
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, ";; Query time: {} msec", self.duration.as_millis())?;
        writeln!(f, ";; SERVER: {}", self.server)?;

        let start: chrono::DateTime<Local> = self.start.into();
        // ;; WHEN: Sat Jun 12 12:14:21 PDT 2021
        writeln!(f, ";; WHEN: {}", start.format("%a %b %-d %H:%M:%S %z %-Y"))?;
        writeln!(
            f,
            ";; MSG SIZE sent: {} rcvd: {}",
            self.request_size, self.response_size
        )
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";{name:<18}      {class:4} {type:6}",
            name = format!("{}.", self.name),
            class = ClassName(self.class),
            r#type = TypeName(self.r#type),
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::A(ip) => fmt::Display::fmt(ip, f),

            Resource::NS(name) => fmt::Display::fmt(name, f),
            Resource::CNAME(name) => fmt::Display::fmt(name, f),
            Resource::PTR(name) => fmt::Display::fmt(name, f),

            Resource::MX(mx) => fmt::Display::fmt(mx, f),

            // RFC 3597 generic form.
            Resource::Unknown(_, rdata) => write!(f, "\\# {} {}", rdata.len(), hex::encode(rdata)),
        }
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // "10 aspmx.l.google.com."
        write!(
            f,
            "{preference} {exchange}",
            preference = self.preference,
            exchange = self.exchange,
        )
    }
}
