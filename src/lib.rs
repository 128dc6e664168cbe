//! # huffcode
//!
//! Builds Huffman codes from symbol frequencies, saves and loads them as a
//! plain text table, and decodes bit streams with them.
//!
//! ```rust
//! use huffcode::{BitString, HuffmanCode};
//!
//! let code = HuffmanCode::from_frequencies(&[5, 9, 12, 13, 16, 45])?;
//!
//! let mut table = Vec::new();
//! code.save(&mut table)?;
//! let loaded = HuffmanCode::load(table.as_slice())?;
//!
//! let mut bits = String::new();
//! code.encode([0, 5, 3], &mut bits)?;
//!
//! let mut symbols = Vec::new();
//! loaded.decode(&mut BitString::new(&bits), &mut symbols)?;
//! assert_eq!(symbols, vec![0, 5, 3]);
//! # Ok::<(), huffcode::Error>(())
//! ```
//!
//! A [`HuffmanCode`] is immutable once built or loaded and is `Send + Sync`,
//! so one code can serve many decode passes on different threads.

pub mod bits;
pub mod decoder;
pub mod error;
pub mod huffman;
pub mod table;

/// An alphabet entry, e.g. a byte value or an out-of-band marker such as an
/// end-of-stream symbol.
pub type Symbol = u32;

pub use bits::{BitReader, BitSink, BitSource, BitString, BitWriter, ByteSink, SymbolSink};
pub use decoder::Decoder;
pub use error::{Error, Result};
pub use huffman::{HuffmanCode, Node};
