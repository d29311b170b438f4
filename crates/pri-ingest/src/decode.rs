//! Incremental transcoding of an export byte stream to UTF-8.

use std::error::Error;
use std::fmt;
use std::io::{self, Read};

use encoding_rs::{Decoder, DecoderResult, Encoding};

/// Raw bytes pulled from the source per refill.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Marker carried inside the `io::Error` raised for an unmappable byte sequence.
#[derive(Debug)]
pub struct MalformedInput;

impl fmt::Display for MalformedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("byte sequence has no mapping in the source encoding")
    }
}

impl Error for MalformedInput {}

/// True when `err` was raised by [`DecodeReader`] for malformed input.
pub fn is_malformed(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<MalformedInput>())
}

/// `Read` adapter yielding the UTF-8 form of `inner`.
///
/// A leading BOM is dropped. Sequences split across refills are carried in the
/// decoder state, so at most one raw and one UTF-8 buffer are held at a time.
pub struct DecodeReader<R> {
    inner: R,
    decoder: Decoder,
    raw: Vec<u8>,
    raw_pos: usize,
    raw_len: usize,
    utf8: Vec<u8>,
    utf8_pos: usize,
    utf8_len: usize,
    finished: bool,
}

impl<R: Read> DecodeReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self::with_capacity(inner, encoding, READ_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: R, encoding: &'static Encoding, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let decoder = encoding.new_decoder_with_bom_removal();
        let utf8_capacity = decoder
            .max_utf8_buffer_length(capacity)
            .unwrap_or(capacity * 4)
            + 16;
        Self {
            inner,
            decoder,
            raw: vec![0; capacity],
            raw_pos: 0,
            raw_len: 0,
            utf8: vec![0; utf8_capacity],
            utf8_pos: 0,
            utf8_len: 0,
            finished: false,
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut last = false;
        if self.raw_pos == self.raw_len {
            self.raw_pos = 0;
            self.raw_len = read_retrying(&mut self.inner, &mut self.raw)?;
            last = self.raw_len == 0;
        }
        let (result, read, written) = self.decoder.decode_to_utf8_without_replacement(
            &self.raw[self.raw_pos..self.raw_len],
            &mut self.utf8,
            last,
        );
        self.raw_pos += read;
        self.utf8_pos = 0;
        self.utf8_len = written;
        match result {
            DecoderResult::InputEmpty => {
                self.finished = last;
                Ok(())
            }
            DecoderResult::OutputFull => Ok(()),
            DecoderResult::Malformed(_, _) => {
                Err(io::Error::new(io::ErrorKind::InvalidData, MalformedInput))
            }
        }
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.utf8_pos == self.utf8_len {
            if self.finished {
                return Ok(0);
            }
            self.fill()?;
        }
        let n = (self.utf8_len - self.utf8_pos).min(buf.len());
        buf[..n].copy_from_slice(&self.utf8[self.utf8_pos..self.utf8_pos + n]);
        self.utf8_pos += n;
        Ok(n)
    }
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8], encoding: &'static Encoding, capacity: usize) -> io::Result<String> {
        let mut reader = DecodeReader::with_capacity(bytes, encoding, capacity);
        let mut out = String::new();
        reader.read_to_string(&mut out)?;
        Ok(out)
    }

    #[test]
    fn latin1_is_transcoded() {
        let text = decode_all(b"Soci\xE9t\xE9", encoding_rs::WINDOWS_1252, 3).unwrap();
        assert_eq!(text, "Société");
    }

    #[test]
    fn utf8_sequence_split_across_refills() {
        let bytes = "Société Générale".as_bytes();
        for capacity in 1..6 {
            let text = decode_all(bytes, encoding_rs::UTF_8, capacity).unwrap();
            assert_eq!(text, "Société Générale", "capacity {capacity}");
        }
    }

    #[test]
    fn bom_is_removed() {
        let text = decode_all(b"\xEF\xBB\xBFindicator", encoding_rs::UTF_8, 2).unwrap();
        assert_eq!(text, "indicator");
    }

    #[test]
    fn late_invalid_byte_is_malformed() {
        let mut bytes = vec![b'a'; 100];
        bytes.push(0xFF);
        let err = decode_all(&bytes, encoding_rs::UTF_8, 8).unwrap_err();
        assert!(is_malformed(&err));
    }

    #[test]
    fn truncated_trailing_sequence_is_malformed() {
        let err = decode_all(b"abc\xC3", encoding_rs::UTF_8, 16).unwrap_err();
        assert!(is_malformed(&err));
    }
}
