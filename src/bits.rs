//! Bit-level collaborators of the code: where decoder input comes from and
//! where encoder output and decoded symbols go.
//!
//! Bits are packed least-significant bit first within each byte, the same
//! order the classic bit streams of deflate use.

use std::io::{self, Write};

use crate::{Error, Result, Symbol};

/// A strictly sequential supply of bits.
pub trait BitSource {
    /// Whether another bit can be read.
    fn has_next_bit(&mut self) -> bool;

    /// Reads the next bit as `0` or `1`.
    fn next_bit(&mut self) -> Result<u8>;
}

/// Receives decoded symbols one at a time, in decode order.
pub trait SymbolSink {
    fn emit(&mut self, symbol: Symbol) -> Result<()>;
}

/// Receives encoded bits one at a time.
pub trait BitSink {
    fn push_bit(&mut self, bit: u8);
}

fn exhausted() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "no bits left in source",
    ))
}

/// Reads bits out of a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    byte_pos: usize,
    buf: u32,
    bits_in_buf: u32,
    remaining: u64,
}

impl<'a> BitReader<'a> {
    /// Every bit of `bytes`, padding included.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_len(bytes, bytes.len() as u64 * 8)
    }

    /// Only the first `bit_len` bits of `bytes`.
    pub fn with_len(bytes: &'a [u8], bit_len: u64) -> Self {
        Self {
            bytes,
            byte_pos: 0,
            buf: 0,
            bits_in_buf: 0,
            remaining: bit_len.min(bytes.len() as u64 * 8),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl BitSource for BitReader<'_> {
    fn has_next_bit(&mut self) -> bool {
        self.remaining > 0
    }

    fn next_bit(&mut self) -> Result<u8> {
        if self.remaining == 0 {
            return Err(exhausted());
        }

        if self.bits_in_buf == 0 {
            self.buf = self.bytes[self.byte_pos] as u32;
            self.byte_pos += 1;
            self.bits_in_buf = 8;
        }

        let bit = (self.buf & 1) as u8;
        self.buf >>= 1;
        self.bits_in_buf -= 1;
        self.remaining -= 1;

        Ok(bit)
    }
}

/// Reads bits written out as `'0'`/`'1'` characters.
#[derive(Debug)]
pub struct BitString<'a> {
    chars: &'a [u8],
    pos: usize,
}

impl<'a> BitString<'a> {
    pub fn new(bits: &'a str) -> Self {
        Self {
            chars: bits.as_bytes(),
            pos: 0,
        }
    }
}

impl BitSource for BitString<'_> {
    fn has_next_bit(&mut self) -> bool {
        self.pos < self.chars.len()
    }

    fn next_bit(&mut self) -> Result<u8> {
        let Some(&c) = self.chars.get(self.pos) else {
            return Err(exhausted());
        };
        self.pos += 1;

        match c {
            b'0' => Ok(0),
            b'1' => Ok(1),
            other => Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid bit character {:?} at {}", other as char, self.pos - 1),
            ))),
        }
    }
}

/// Packs bits into bytes.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// The packed bytes (last one zero-padded) and the number of meaningful bits.
    pub fn finish(self) -> (Vec<u8>, u64) {
        (self.bytes, self.bit_len)
    }
}

impl BitSink for BitWriter {
    fn push_bit(&mut self, bit: u8) {
        let offset = (self.bit_len % 8) as u32;
        if offset == 0 {
            self.bytes.push(0);
        }

        if bit != 0 {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << offset;
        }

        self.bit_len += 1;
    }
}

impl BitSink for String {
    fn push_bit(&mut self, bit: u8) {
        self.push(if bit == 0 { '0' } else { '1' });
    }
}

impl SymbolSink for Vec<Symbol> {
    fn emit(&mut self, symbol: Symbol) -> Result<()> {
        self.push(symbol);
        Ok(())
    }
}

/// Writes every symbol as a single byte.
#[derive(Debug)]
pub struct ByteSink<W: Write> {
    inner: W,
}

impl<W: Write> ByteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> SymbolSink for ByteSink<W> {
    fn emit(&mut self, symbol: Symbol) -> Result<()> {
        let byte = u8::try_from(symbol).map_err(|_| Error::SymbolOutOfRange(symbol))?;
        self.inner.write_all(&[byte])?;
        Ok(())
    }
}
