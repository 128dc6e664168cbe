use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use log::debug;

use crate::bits::BitSink;
use crate::{Error, Result, Symbol};

/// A node of a code tree.
///
/// Trees produced by [`HuffmanCode::from_weights`] are strictly binary: every
/// internal node has both children. A tree loaded from a table that does not
/// cover every branch may have an absent child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: Symbol,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
}

impl Node {
    pub fn leaf(symbol: Symbol, weight: u64) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Joins two subtrees, or `None` if their combined weight overflows.
    pub fn internal(left: Node, right: Node) -> Option<Self> {
        Some(Node::Internal {
            weight: left.weight().checked_add(right.weight())?,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        })
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// The child reached by `bit`, if present. Leaves have no children.
    pub fn child(&self, bit: u8) -> Option<&Node> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => {
                if bit == 0 {
                    left.as_deref()
                } else {
                    right.as_deref()
                }
            }
        }
    }
}

/// Entry of the merge queue. Ordered so that `BinaryHeap` pops the lowest
/// weight first, and among equal weights the entry queued first.
#[derive(Debug)]
struct Queued {
    seq: u64,
    node: Node,
}

impl Eq for Queued {}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.node.weight(), other.seq).cmp(&(self.node.weight(), self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A prefix-free code held as a tree.
///
/// The tree is never mutated after construction and owns its nodes
/// exclusively, so a `HuffmanCode` is `Send + Sync`: any number of threads may
/// decode with the same `&HuffmanCode` at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCode {
    root: Node,
}

impl HuffmanCode {
    /// Builds a code from a frequency array indexed by symbol value.
    pub fn from_frequencies(frequencies: &[u64]) -> Result<Self> {
        Self::from_weights(
            frequencies
                .iter()
                .enumerate()
                .map(|(symbol, &freq)| (symbol as Symbol, freq)),
        )
    }

    /// Builds a code from `(symbol, frequency)` pairs. Symbols with frequency 0
    /// are left out, repeated symbols have their frequencies added up.
    ///
    /// Ties between equal weights are broken first-queued-first: leaves are
    /// queued in ascending symbol order, every merged node after all the nodes
    /// queued before it. The first of the two nodes taken off the queue
    /// becomes the left (`0`) child.
    pub fn from_weights(weights: impl IntoIterator<Item = (Symbol, u64)>) -> Result<Self> {
        let mut freq_dict: BTreeMap<Symbol, u64> = BTreeMap::new();
        for (symbol, freq) in weights {
            let total = freq_dict.entry(symbol).or_default();
            *total = total.checked_add(freq).ok_or(Error::WeightOverflow)?;
        }

        let mut pqueue = BinaryHeap::new();
        let mut seq = 0;
        for (&symbol, &freq) in freq_dict.iter().filter(|&(_, &freq)| freq > 0) {
            pqueue.push(Queued {
                seq,
                node: Node::leaf(symbol, freq),
            });
            seq += 1;
        }
        let symbols = pqueue.len();

        while pqueue.len() > 1 {
            let ln = pqueue.pop().expect("checked with while loop condition");
            let rn = pqueue.pop().expect("checked with while loop condition");

            pqueue.push(Queued {
                seq,
                node: Node::internal(ln.node, rn.node).ok_or(Error::WeightOverflow)?,
            });
            seq += 1;
        }

        let root = pqueue.pop().ok_or(Error::EmptyAlphabet)?.node;
        let code = Self { root };
        debug!(
            "built code for {} symbols, total weight {}, depth {}",
            symbols,
            code.weight(),
            code.depth()
        );

        Ok(code)
    }

    pub(crate) fn from_root(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total weight of the tree. For a built code this is the sum of the input
    /// frequencies; loaded codes carry no weights.
    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    /// Number of symbols in the code.
    pub fn symbol_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Internal { left, right, .. } => {
                    left.as_deref().map_or(0, count) + right.as_deref().map_or(0, count)
                }
            }
        }
        count(&self.root)
    }

    /// Length of the longest code word.
    pub fn depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Internal { left, right, .. } => {
                    1 + left
                        .as_deref()
                        .map_or(0, depth)
                        .max(right.as_deref().map_or(0, depth))
                }
            }
        }
        depth(&self.root)
    }

    /// Whether every internal node has both children.
    pub fn is_complete(&self) -> bool {
        fn complete(node: &Node) -> bool {
            match node {
                Node::Leaf { .. } => true,
                Node::Internal {
                    left: Some(left),
                    right: Some(right),
                    ..
                } => complete(left) && complete(right),
                Node::Internal { .. } => false,
            }
        }
        complete(&self.root)
    }

    /// `(symbol, path)` pairs in depth-first order, `0` branches first.
    /// A code with a single symbol gives it the empty path.
    pub fn code_table(&self) -> Vec<(Symbol, String)> {
        let mut table = Vec::new();
        fill(&self.root, String::new(), &mut table);
        table
    }

    /// The path of `symbol`, if it is part of the code.
    pub fn code_of(&self, symbol: Symbol) -> Option<String> {
        self.code_table()
            .into_iter()
            .find_map(|(s, path)| (s == symbol).then_some(path))
    }

    /// Writes the code word of every symbol to `sink`. In a single-symbol
    /// code every occurrence is written as one `0` bit.
    pub fn encode(
        &self,
        symbols: impl IntoIterator<Item = Symbol>,
        sink: &mut impl BitSink,
    ) -> Result<()> {
        let codec_dict: HashMap<Symbol, String> = self.code_table().into_iter().collect();

        for symbol in symbols {
            let code = codec_dict
                .get(&symbol)
                .ok_or(Error::UnknownSymbol(symbol))?;
            if code.is_empty() {
                sink.push_bit(0);
            }
            for c in code.bytes() {
                sink.push_bit(c - b'0');
            }
        }

        Ok(())
    }
}

fn fill(node: &Node, code: String, table: &mut Vec<(Symbol, String)>) {
    match node {
        Node::Leaf { symbol, .. } => table.push((*symbol, code)),
        Node::Internal { left, right, .. } => {
            if let Some(ln) = left {
                fill(ln, format!("{}0", code), table);
            }
            if let Some(rn) = right {
                fill(rn, format!("{}1", code), table);
            }
        }
    }
}
