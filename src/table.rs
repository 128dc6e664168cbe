//! Text form of a code: one line with the symbol, then one line with its
//! path, for every symbol. There is no header and no terminator.
//!
//! ```text
//! 70
//! 0
//! 67
//! 100
//! ```

use std::io::{self, BufRead, Write};

use log::debug;

use crate::huffman::{HuffmanCode, Node};
use crate::{Error, Result, Symbol};

impl HuffmanCode {
    /// Writes the code in depth-first order, `0` branches first.
    pub fn save<W: Write>(&self, mut output: W) -> Result<()> {
        write(&mut output, self.root(), &mut String::new())?;
        output.flush()?;
        Ok(())
    }

    /// Reads a code written by [`HuffmanCode::save`], or any other table whose
    /// paths are prefix-free, in any record order.
    pub fn load<R: BufRead>(input: R) -> Result<Self> {
        let mut lines = input.lines();
        let mut root = None;
        let mut line = 0;
        let mut records = 0;

        while let Some(value) = lines.next() {
            line += 1;
            let value = text_line(value, line)?;
            let symbol = parse_symbol(&value, line)?;

            let Some(code) = lines.next() else {
                return Err(Error::malformed(
                    line,
                    format!("symbol {symbol} has no path line"),
                ));
            };
            line += 1;
            let code = text_line(code, line)?;

            insert(&mut root, symbol, code.trim_end_matches('\r'), line)?;
            records += 1;
        }

        let code = finish(root, line)?;
        debug!(
            "loaded {} codes from {} lines, depth {}",
            records,
            line,
            code.depth()
        );

        Ok(code)
    }

    /// Builds a code from `(symbol, path)` pairs, following the same rules as
    /// [`HuffmanCode::load`]. Errors report the line the record would occupy
    /// in the text form.
    pub fn from_code_table<S: AsRef<str>>(
        table: impl IntoIterator<Item = (Symbol, S)>,
    ) -> Result<Self> {
        let mut root = None;
        let mut line = 0;

        for (symbol, code) in table {
            line += 2;
            insert(&mut root, symbol, code.as_ref(), line)?;
        }

        finish(root, line)
    }
}

fn write<W: Write>(output: &mut W, node: &Node, code: &mut String) -> Result<()> {
    match node {
        Node::Leaf { symbol, .. } => {
            writeln!(output, "{symbol}")?;
            writeln!(output, "{code}")?;
        }
        Node::Internal { left, right, .. } => {
            for (bit, child) in [('0', left), ('1', right)] {
                if let Some(child) = child {
                    code.push(bit);
                    write(output, child, code)?;
                    code.pop();
                }
            }
        }
    }

    Ok(())
}

fn text_line(read: io::Result<String>, line: usize) -> Result<String> {
    read.map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => Error::malformed(line, "line is not valid UTF-8"),
        _ => Error::Io(e),
    })
}

fn parse_symbol(value: &str, line: usize) -> Result<Symbol> {
    let value = value.trim();
    value
        .parse()
        .map_err(|_| Error::malformed(line, format!("invalid symbol {value:?}")))
}

fn insert(root: &mut Option<Box<Node>>, symbol: Symbol, code: &str, line: usize) -> Result<()> {
    if let Some(c) = code.chars().find(|c| !matches!(c, '0' | '1')) {
        return Err(Error::malformed(
            line,
            format!("invalid character {c:?} in path of symbol {symbol}"),
        ));
    }

    let mut slot = root;
    for (depth, bit) in code.bytes().enumerate() {
        let node = slot.get_or_insert_with(|| {
            Box::new(Node::Internal {
                weight: 0,
                left: None,
                right: None,
            })
        });

        match node.as_mut() {
            Node::Leaf { symbol: other, .. } => {
                return Err(Error::malformed(
                    line,
                    format!(
                        "path {code:?} of symbol {symbol} runs through the code of symbol {other} at depth {depth}"
                    ),
                ));
            }
            Node::Internal { left, right, .. } => {
                slot = if bit == b'0' { left } else { right };
            }
        }
    }

    if let Some(existing) = slot.as_deref() {
        let reason = match existing {
            Node::Leaf { symbol: other, .. } => {
                format!("symbol {symbol} has the same path {code:?} as symbol {other}")
            }
            Node::Internal { .. } => {
                format!("path {code:?} of symbol {symbol} is a prefix of another code")
            }
        };
        return Err(Error::malformed(line, reason));
    }

    *slot = Some(Box::new(Node::leaf(symbol, 0)));
    Ok(())
}

fn finish(root: Option<Box<Node>>, line: usize) -> Result<HuffmanCode> {
    match root {
        Some(root) => Ok(HuffmanCode::from_root(*root)),
        None => Err(Error::malformed(line, "table has no codes")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<HuffmanCode> {
        HuffmanCode::load(text.as_bytes())
    }

    fn reason(result: Result<HuffmanCode>) -> (usize, String) {
        match result {
            Err(Error::MalformedTable { line, reason }) => (line, reason),
            other => panic!("expected a malformed table, got {other:?}"),
        }
    }

    #[test]
    fn save_writes_symbol_and_path_lines() {
        let code = HuffmanCode::from_frequencies(&[1, 2, 3]).unwrap();
        let mut out = Vec::new();
        code.save(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2\n0\n0\n10\n1\n11\n");
    }

    #[test]
    fn save_single_symbol_writes_empty_path() {
        let code = HuffmanCode::from_frequencies(&[0, 5]).unwrap();
        let mut out = Vec::new();
        code.save(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n\n");
    }

    #[test]
    fn load_accepts_any_record_order() {
        let code = load("1\n11\n2\n0\n0\n10\n").unwrap();
        assert_eq!(
            code.code_table(),
            vec![
                (2, "0".to_string()),
                (0, "10".to_string()),
                (1, "11".to_string()),
            ]
        );
        assert!(code.is_complete());
    }

    #[test]
    fn load_tolerates_crlf_line_endings() {
        let code = load("65\r\n0\r\n66\r\n1\r\n").unwrap();
        assert_eq!(code.code_of(66).as_deref(), Some("1"));
    }

    #[test]
    fn load_single_empty_path() {
        let code = load("9\n\n").unwrap();
        assert_eq!(code.root(), &Node::leaf(9, 0));
    }

    #[test]
    fn load_rejects_code_below_a_leaf() {
        let (line, reason) = reason(load("66\n0\n65\n01\n"));
        assert_eq!(line, 4);
        assert!(reason.contains("runs through"), "{reason}");
    }

    #[test]
    fn load_rejects_code_above_a_leaf() {
        let (line, reason) = reason(load("65\n01\n66\n0\n"));
        assert_eq!(line, 4);
        assert!(reason.contains("prefix"), "{reason}");
    }

    #[test]
    fn load_rejects_duplicate_paths() {
        let (_, reason) = reason(load("65\n10\n66\n10\n"));
        assert!(reason.contains("same path"), "{reason}");
    }

    #[test]
    fn load_rejects_empty_path_among_others() {
        reason(load("65\n\n66\n1\n"));
        reason(load("66\n1\n65\n\n"));
    }

    #[test]
    fn load_rejects_missing_path_line() {
        let (line, reason) = reason(load("65\n0\n66\n"));
        assert_eq!(line, 3);
        assert!(reason.contains("no path line"), "{reason}");
    }

    #[test]
    fn load_rejects_bad_lines() {
        reason(load("-1\n0\n"));
        reason(load("A\n0\n"));
        reason(load("65\n0x\n"));
        reason(load(""));
    }

    #[test]
    fn load_rejects_non_utf8_lines() {
        let (line, reason) = reason(HuffmanCode::load(&b"65\n0\n\xff\xfe\n1\n"[..]));
        assert_eq!(line, 3);
        assert!(reason.contains("UTF-8"), "{reason}");

        let (line, _) = self::reason(HuffmanCode::load(&b"65\n0\xc3\n"[..]));
        assert_eq!(line, 2);
    }

    #[test]
    fn load_keeps_partial_tables() {
        let code = load("65\n00\n66\n1\n").unwrap();
        assert!(!code.is_complete());
        assert_eq!(code.symbol_count(), 2);
    }

    #[test]
    fn from_code_table_matches_load() {
        let code = HuffmanCode::from_code_table([(65, "01"), (66, "00"), (67, "1")]).unwrap();
        assert_eq!(code, load("65\n01\n66\n00\n67\n1\n").unwrap());

        let (line, _) = reason(HuffmanCode::from_code_table([(65, "01"), (66, "0")]));
        assert_eq!(line, 4);
    }
}
