//! Encoding and decompression of domain names.
//!
//! Names are always written uncompressed. Reading a name that may contain
//! compression pointers requires the whole datagram, since a pointer is an
//! absolute offset into it.

use crate::bail;
use crate::errors::Error;
use std::io;

/// Restricts the length of a domain label to 63 characters. [RFC1035]
pub const MAX_LABEL_LEN: usize = 63;

/// Restricts the length of an encoded name to 255 bytes. [RFC1035]
pub const MAX_NAME_LEN: usize = 255;

/// What a single length byte introduces.
#[derive(Debug, PartialEq)]
pub(crate) enum Label {
    /// The zero length root label, terminating the name.
    End,

    /// The first byte of a two byte compression pointer.
    Pointer,

    /// A literal label of this many bytes.
    Literal(usize),
}

pub(crate) fn label_kind(len: u8) -> io::Result<Label> {
    match len & 0xC0 {
        0x00 if len == 0 => Ok(Label::End),
        0x00 => Ok(Label::Literal(len.into())),
        0xC0 => Ok(Label::Pointer),

        // 0x40 and 0x80 are reserved (and the extended label types were never deployed).
        _ => bail!(
            InvalidData,
            "unsupported label type {0:#b}",
            len & 0xC0
        ),
    }
}

/// Splits a canonical name into its labels. The root is "" (or ".").
fn labels(name: &str) -> impl Iterator<Item = &str> {
    let name = name.strip_suffix('.').unwrap_or(name);
    name.split('.').filter(move |_| !name.is_empty())
}

/// Returns the number of bytes `name` occupies once encoded.
///
/// This is `sum(1 + len(label)) + 1`, so "example.com" takes 13 bytes.
pub fn encoded_len(name: &str) -> usize {
    labels(name).map(|label| 1 + label.len()).sum::<usize>() + 1
}

/// Writes `name` into the supplied `Vec<u8>` as a sequence of length
/// prefixed labels followed by the zero length root label.
///
/// No compression pointers are ever produced.
pub fn write_name(buf: &mut Vec<u8>, name: &str) -> Result<(), Error> {
    if encoded_len(name) > MAX_NAME_LEN {
        return Err(Error::InvalidName(format!(
            "'{}' is longer than {} bytes",
            name, MAX_NAME_LEN
        )));
    }

    for label in labels(name) {
        if label.is_empty() {
            return Err(Error::InvalidName(format!(
                "empty label in domain name '{}'",
                name
            )));
        }

        if label.len() > MAX_LABEL_LEN {
            return Err(Error::InvalidName(format!(
                "label '{}' longer than {} characters",
                label, MAX_LABEL_LEN
            )));
        }

        // Write the length.
        buf.push(label.len() as u8);

        // Then the actual label.
        buf.extend_from_slice(label.as_bytes());
    }

    buf.push(0);

    Ok(())
}

/// Turns an encoded name (for example a record's name field, or the rdata of
/// a CNAME) into a dotted domain, resolving any compression pointers against
/// `wire`, the full datagram the bytes came from.
///
/// Every label is followed by a dot, so the result always ends with a `.`
/// ("www.example.com."). The root name is returned as ".". Decoding stops at
/// the root label, after following a pointer, or at the end of `bytes`.
///
/// A pointer found inside `wire` must point strictly before every offset
/// already visited, so decoding terminates even for hostile input.
pub fn decompress(wire: &[u8], bytes: &[u8]) -> io::Result<String> {
    let mut domain = String::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match label_kind(bytes[pos])? {
            Label::End => break,
            Label::Pointer => {
                let ptr = pointer(bytes, pos)?;
                follow(wire, ptr, &mut domain)?;
                break;
            }
            Label::Literal(len) => {
                let label = match bytes.get(pos + 1..pos + 1 + len) {
                    Some(label) => label,
                    None => bail!(UnexpectedEof, "label at {} runs past the end", pos),
                };
                push_label(&mut domain, label)?;
                pos += 1 + len;
            }
        }
    }

    if domain.is_empty() {
        domain.push('.');
    }

    Ok(domain)
}

/// Appends the labels found at `start` in `wire` to `domain`.
fn follow(wire: &[u8], start: usize, domain: &mut String) -> io::Result<()> {
    let mut pos = start;

    // Lowest offset entered so far.
    let mut limit = start;

    loop {
        let len = match wire.get(pos) {
            Some(len) => *len,
            None => bail!(
                InvalidData,
                "compressed name offset {} is past the end of the message",
                pos
            ),
        };

        match label_kind(len)? {
            Label::End => return Ok(()),
            Label::Pointer => {
                let ptr = pointer(wire, pos)?;

                // Make sure we don't get into a loop.
                if ptr >= limit {
                    bail!(
                        InvalidData,
                        "invalid compressed pointer at {} to {}, it does not point backwards",
                        pos,
                        ptr
                    );
                }
                limit = ptr;
                pos = ptr;
            }
            Label::Literal(len) => {
                let label = match wire.get(pos + 1..pos + 1 + len) {
                    Some(label) => label,
                    None => bail!(UnexpectedEof, "label at {} runs past the end", pos),
                };
                push_label(domain, label)?;
                pos += 1 + len;
            }
        }
    }
}

/// Reads the 14 bit offset of the pointer starting at `pos`.
fn pointer(buf: &[u8], pos: usize) -> io::Result<usize> {
    match buf.get(pos..pos + 2) {
        Some(b) => Ok(usize::from(b[0] & 0x3F) << 8 | usize::from(b[1])),
        None => bail!(UnexpectedEof, "truncated compression pointer at {}", pos),
    }
}

fn push_label(domain: &mut String, label: &[u8]) -> io::Result<()> {
    let label = match std::str::from_utf8(label) {
        Err(e) => bail!(InvalidData, "invalid label: {}", e),
        Ok(s) => s,
    };

    if !label.is_ascii() {
        bail!(InvalidData, "invalid label '{:}': not valid ascii", label);
    }

    domain.push_str(label);
    domain.push('.');
    Ok(())
}
