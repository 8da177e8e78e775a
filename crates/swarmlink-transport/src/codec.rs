use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::TransportError;

/// Line terminator written after every outbound line.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Default maximum line length: 8 KiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024;

/// CR/LF line codec.
///
/// Decoding splits on `\n` and strips one trailing `\r`. Bytes that are not
/// valid UTF-8 are replaced rather than rejected: the remote board prints
/// arbitrary noise while booting and none of it may kill the link.
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_line_length: usize,
    /// How far into the buffer we have already searched for `\n`.
    next_index: usize,
    /// Inside an overlong line; drop input up to the next `\n`.
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
            discarding: false,
        }
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Forget the partial search state, used after the buffer is cleared.
    pub(crate) fn reset(&mut self) {
        self.next_index = 0;
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, TransportError> {
        if self.discarding {
            match src.iter().position(|b| *b == b'\n') {
                Some(index) => {
                    src.advance(index + 1);
                    self.discarding = false;
                }
                None => {
                    src.clear();
                    return Ok(None);
                }
            }
        }

        let newline = src[self.next_index..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|offset| self.next_index + offset);

        match newline {
            Some(index) => {
                self.next_index = 0;
                let mut line = src.split_to(index + 1);
                line.truncate(index);
                if line.last() == Some(&b'\r') {
                    line.truncate(index - 1);
                }
                Ok(Some(String::from_utf8_lossy(&line).into_owned()))
            }
            None if src.len() > self.max_line_length => {
                let len = src.len();
                src.advance(len);
                self.next_index = 0;
                self.discarding = true;
                Err(TransportError::LineTooLong {
                    len,
                    max: self.max_line_length,
                })
            }
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }
}

impl Encoder<&str> for LineCodec {
    type Error = TransportError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<(), TransportError> {
        dst.reserve(line.len() + LINE_TERMINATOR.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(LINE_TERMINATOR);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_crlf_and_lf_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"R: 12\r\nS: A1 1\n"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("R: 12"));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("S: A1 1"));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn keeps_trailing_space_of_empty_reply() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"R: \r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("R: "));
    }

    #[test]
    fn partial_line_waits_for_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"S: A1"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b" 0\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("S: A1 0"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"\xff\xfeboot\r\n"[..]);
        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.ends_with("boot"));
    }

    #[test]
    fn overlong_line_is_rejected_and_dropped() {
        let mut codec = LineCodec::with_max_length(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, TransportError::LineTooLong { len: 10, max: 8 }));
        assert!(buf.is_empty());
    }

    #[test]
    fn rest_of_overlong_line_is_dropped() {
        let mut codec = LineCodec::with_max_length(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        assert!(codec.decode(&mut buf).is_err());

        buf.extend_from_slice(b"still the same line");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        buf.extend_from_slice(b" tail\r\nS: A1 1\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("S: A1 1"));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn encodes_with_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("A1.subscribe(0)", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"A1.subscribe(0)\r\n");
    }
}
