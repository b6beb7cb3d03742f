//! The Interpreter's I/O side: `NumIn`/`CharIn` read from a byte source,
//! `NumOut`/`CharOut` write to a byte sink. Generic over
//! `Read`/`Write` so the CLI front end can wire up real stdio while tests
//! wire up in-memory buffers.

use std::io::{self, Read, Write};

use crate::error::VmError;

/// Reads whitespace-delimited decimal integers (`NumIn`) or single Unicode
/// codepoints (`CharIn`) from an underlying byte stream.
pub struct Input<R: Read> {
    reader: io::Bytes<R>,
    pending: Option<u8>,
}

impl<R: Read> Input<R> {
    pub fn new(reader: R) -> Self {
        Self { reader: reader.bytes(), pending: None }
    }

    fn next_byte(&mut self) -> Option<u8> {
        if let Some(b) = self.pending.take() {
            return Some(b);
        }
        self.reader.next().and_then(Result::ok)
    }

    /// Reads one decimal integer, skipping leading whitespace. A bare `-`
    /// or `+` sign is honored. Fails with `InvalidInput` at end of stream.
    pub fn read_number(&mut self) -> Result<i32, VmError> {
        let mut byte = loop {
            match self.next_byte() {
                Some(b) if (b as char).is_whitespace() => continue,
                Some(b) => break b,
                None => return Err(VmError::InvalidInput),
            }
        };

        let mut text = String::new();
        if byte == b'-' || byte == b'+' {
            text.push(byte as char);
            byte = self.next_byte().ok_or(VmError::InvalidInput)?;
        }
        loop {
            if !(byte as char).is_ascii_digit() {
                self.pending = Some(byte);
                break;
            }
            text.push(byte as char);
            match self.next_byte() {
                Some(b) => byte = b,
                None => break,
            }
        }

        text.parse().map_err(|_| VmError::InvalidInput)
    }

    /// Reads one Unicode codepoint as its ordinal value.
    pub fn read_char(&mut self) -> Result<i32, VmError> {
        let first = self.next_byte().ok_or(VmError::InvalidInput)?;
        let width = utf8_width(first);
        if width == 1 {
            return Ok(first as i32);
        }
        let mut buf = vec![first];
        for _ in 1..width {
            buf.push(self.next_byte().ok_or(VmError::InvalidInput)?);
        }
        std::str::from_utf8(&buf)
            .ok()
            .and_then(|s| s.chars().next())
            .map(|c| c as i32)
            .ok_or(VmError::InvalidInput)
    }
}

fn utf8_width(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

/// Writes `NumOut` (decimal text) and `CharOut` (raw Unicode) to an
/// underlying byte sink.
pub struct Output<W: Write> {
    writer: W,
}

impl<W: Write> Output<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_number(&mut self, value: i32) -> io::Result<()> {
        write!(self.writer, "{value}")
    }

    pub fn write_char(&mut self, value: i32) -> io::Result<()> {
        match char::from_u32(value as u32) {
            Some(c) => write!(self.writer, "{c}"),
            None => Ok(()),
        }
    }

    pub fn write_newline(&mut self) -> io::Result<()> {
        writeln!(self.writer)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_number_skips_leading_whitespace() {
        let mut input = Input::new("   42".as_bytes());
        assert_eq!(input.read_number().unwrap(), 42);
    }

    #[test]
    fn read_number_honors_sign() {
        let mut input = Input::new("-7 8".as_bytes());
        assert_eq!(input.read_number().unwrap(), -7);
        assert_eq!(input.read_number().unwrap(), 8);
    }

    #[test]
    fn read_char_returns_codepoint() {
        let mut input = Input::new("Hi".as_bytes());
        assert_eq!(input.read_char().unwrap(), 'H' as i32);
        assert_eq!(input.read_char().unwrap(), 'i' as i32);
    }

    #[test]
    fn read_past_end_is_invalid_input() {
        let mut input = Input::new("".as_bytes());
        assert!(matches!(input.read_number(), Err(VmError::InvalidInput)));
    }

    #[test]
    fn output_writes_numbers_and_chars() {
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            out.write_number(-13).unwrap();
            out.write_char('!' as i32).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "-13!");
    }
}
