use log::debug;

use crate::bits::{BitSource, SymbolSink};
use crate::huffman::{HuffmanCode, Node};
use crate::{Error, Result, Symbol};

/// Walks a code tree bit by bit and emits a symbol at every leaf.
///
/// The only state kept between bits is the current node, so a decode pass
/// costs O(1) per bit. A `Decoder` borrows its code immutably; several of
/// them may share one `HuffmanCode` across threads.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    code: &'a HuffmanCode,
    terminator: Option<Symbol>,
}

impl<'a> Decoder<'a> {
    pub fn new(code: &'a HuffmanCode) -> Self {
        Self {
            code,
            terminator: None,
        }
    }

    /// Stops decoding once `symbol` is decoded. The terminator itself is not
    /// emitted and any bits after it are left in the source.
    pub fn with_terminator(mut self, symbol: Symbol) -> Self {
        self.terminator = Some(symbol);
        self
    }

    /// Decodes `bits` into `output` and returns the number of symbols emitted.
    ///
    /// The source must run out exactly at the end of a code word, or at the
    /// terminator when one is set; otherwise the stream is reported as
    /// truncated.
    pub fn decode<S, K>(&self, bits: &mut S, output: &mut K) -> Result<u64>
    where
        S: BitSource + ?Sized,
        K: SymbolSink + ?Sized,
    {
        let root = self.code.root();
        let mut current = root;
        let mut consumed: u64 = 0;
        let mut emitted: u64 = 0;

        while bits.has_next_bit() {
            let bit = bits.next_bit()?;
            consumed += 1;

            // A single-symbol code spends one bit per symbol, whatever its value.
            let next = match current {
                Node::Leaf { .. } => current,
                Node::Internal { .. } => current
                    .child(bit)
                    .ok_or(Error::MissingMapping { bit, consumed })?,
            };

            match next {
                Node::Leaf { symbol, .. } => {
                    if self.terminator == Some(*symbol) {
                        debug!("decoded {emitted} symbols from {consumed} bits, stopped at terminator");
                        return Ok(emitted);
                    }
                    output.emit(*symbol)?;
                    emitted += 1;
                    current = root;
                }
                Node::Internal { .. } => current = next,
            }
        }

        if !std::ptr::eq(current, root) || self.terminator.is_some() {
            return Err(Error::TruncatedStream { consumed });
        }

        debug!("decoded {emitted} symbols from {consumed} bits");
        Ok(emitted)
    }
}

impl HuffmanCode {
    /// Decodes every bit of `bits` with this code.
    pub fn decode<S, K>(&self, bits: &mut S, output: &mut K) -> Result<u64>
    where
        S: BitSource + ?Sized,
        K: SymbolSink + ?Sized,
    {
        Decoder::new(self).decode(bits, output)
    }
}
