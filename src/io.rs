//! Various traits to help parsing of DNS messages.
//!
//! Every read goes through a [`Cursor`], so reading past the end of a
//! datagram is an `UnexpectedEof` error rather than an out of bounds access.

use crate::bail;
use crate::name::{label_kind, Label};
use byteorder::{ReadBytesExt, BE};
use std::io;
use std::io::Cursor;
use std::io::SeekFrom;

pub trait SeekExt: io::Seek {
    /// Returns the number of bytes remaining to be consumed.
    /// This is used as a way to check for malformed input.
    fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;

        // reset position
        self.seek(SeekFrom::Start(pos))?;

        Ok(len.saturating_sub(pos))
    }
}

impl<'a> SeekExt for Cursor<&'a [u8]> {
    fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.position();
        let len = self.get_ref().len() as u64;

        Ok(len.saturating_sub(pos))
    }
}

/// All types that implement `Read` and `Seek` get methods defined
/// in `DNSReadExt` for free.
impl<R: io::Read + ?Sized + io::Seek> DNSReadExt for R {}

/// Extensions to io::Read to add some DNS specific types.
pub trait DNSReadExt: io::Read + io::Seek {
    /// Reads the name of a question.
    ///
    /// Nothing can precede the question section, so question names are
    /// always a literal sequence of labels. The name is returned in its
    /// canonical form, dot separated without a trailing dot.
    ///
    /// # Errors
    ///
    /// Will return a io::Error(InvalidData) if the name contains a compression
    /// pointer or a non ASCII label, or a more general io::Error on any other
    /// read failure.
    fn read_qname(&mut self) -> io::Result<String> {
        let mut labels = Vec::new();

        loop {
            let len = self.read_u8()?;
            match label_kind(len)? {
                Label::End => break,
                Label::Pointer => bail!(InvalidData, "compression pointer in question name"),
                Label::Literal(len) => {
                    let mut label = vec![0; len];
                    self.read_exact(&mut label)?;

                    // Really this is meant to be ASCII, but we read as utf8
                    // (as that what Rust provides).
                    let label = match String::from_utf8(label) {
                        Err(e) => bail!(InvalidData, "invalid label: {}", e),
                        Ok(s) => s,
                    };

                    if !label.is_ascii() {
                        bail!(InvalidData, "invalid label '{:}': not valid ascii", label);
                    }

                    labels.push(label);
                }
            }
        }

        Ok(labels.join("."))
    }

    /// Reads the name field of a resource record without resolving it.
    ///
    /// The field ends either at a zero terminator or just after a two byte
    /// compression pointer. The returned bytes are exactly the bytes that
    /// made up the field, so the record's length on the wire is known.
    fn read_name_field(&mut self) -> io::Result<Vec<u8>> {
        let mut field = Vec::new();

        loop {
            let len = self.read_u8()?;
            field.push(len);

            match label_kind(len)? {
                Label::End => break,
                Label::Pointer => {
                    field.push(self.read_u8()?);
                    break;
                }
                Label::Literal(len) => {
                    let start = field.len();
                    field.resize(start + len, 0);
                    self.read_exact(&mut field[start..])?;
                }
            }
        }

        Ok(field)
    }

    /// Reads a 16 bit length, followed by that many bytes.
    fn read_rdata(&mut self) -> io::Result<Vec<u8>> {
        let len = self.read_u16::<BE>()?;
        let mut rdata = vec![0; len.into()];
        self.read_exact(&mut rdata)?;

        Ok(rdata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_qname() {
        let mut cur = Cursor::new(&b"\x07example\x03com\x00\x00\x01"[..]);
        assert_eq!(cur.read_qname().unwrap(), "example.com");
        assert_eq!(cur.position(), 13);

        let mut cur = Cursor::new(&b"\x00"[..]);
        assert_eq!(cur.read_qname().unwrap(), "");
    }

    #[test]
    fn test_read_qname_rejects_pointer() {
        let mut cur = Cursor::new(&b"\x03www\xc0\x0c"[..]);
        let err = cur.read_qname().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_qname_truncated() {
        let mut cur = Cursor::new(&b"\x07exam"[..]);
        let err = cur.read_qname().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_name_field() {
        struct TestCase<'a> {
            input: &'a [u8],
            want: &'a [u8],
        }

        let tests = vec![
            // A bare pointer.
            TestCase {
                input: b"\xc0\x0c\x00\x01",
                want: b"\xc0\x0c",
            },
            // Labels all the way to the root.
            TestCase {
                input: b"\x02ns\x03net\x00\x00\x02",
                want: b"\x02ns\x03net\x00",
            },
            // Labels ending in a pointer.
            TestCase {
                input: b"\x03www\xc0\x0c\x00\x05",
                want: b"\x03www\xc0\x0c",
            },
            // The root.
            TestCase {
                input: b"\x00\x00\x02",
                want: b"\x00",
            },
        ];

        for test in tests {
            let mut cur = Cursor::new(test.input);
            let got = cur.read_name_field().expect("failed to read name field");
            assert_eq!(got, test.want);
            assert_eq!(cur.position() as usize, test.want.len());
        }
    }

    #[test]
    fn test_read_rdata_out_of_range() {
        // Claims 4 bytes of rdata, but only carries 2.
        let mut cur = Cursor::new(&b"\x00\x04\x7f\x00"[..]);
        let err = cur.read_rdata().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_remaining() {
        let mut cur = Cursor::new(&b"\x01\x02\x03"[..]);
        cur.set_position(1);
        assert_eq!(cur.remaining().unwrap(), 2);
    }
}
