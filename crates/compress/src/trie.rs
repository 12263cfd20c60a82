use crate::dict::{DICT_SYMBOLS, Dictionary};

/// One arena node. Children are arena indices; `symbol` is set when some
/// dictionary code terminates at this node.
#[derive(Clone, Copy, Debug, Default)]
struct Node {
    zero: Option<u32>,
    one: Option<u32>,
    symbol: Option<u8>,
}

/// Opaque position inside a [`DecodeTrie`] walk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrieCursor(u32);

/// The binary decode trie built from a [`Dictionary`].
///
/// Each edge corresponds to one code bit (most-significant first); a node
/// carries a symbol only when it terminates some code's path. Nodes live
/// in a flat arena indexed by `u32`, so construction and teardown are
/// iterative regardless of code depth, and dropping the trie frees every
/// node without a recursive walk.
#[derive(Clone, Debug)]
pub struct DecodeTrie {
    nodes: Vec<Node>,
}

impl DecodeTrie {
    /// Builds the trie for all 256 dictionary codes.
    ///
    /// A zero-length code marks the root itself; such a symbol can never
    /// be produced by decoding, because symbols are only emitted after at
    /// least one edge has been walked.
    #[must_use]
    pub fn build(dict: &Dictionary) -> Self {
        let mut nodes = vec![Node::default()];

        for symbol in 0..DICT_SYMBOLS {
            let symbol = symbol as u8;
            let code = dict.code(symbol);
            let mut cursor = 0usize;

            for shift in (0..code.len()).rev() {
                let bit = code.bits() >> shift & 1 == 1;
                let next = if bit {
                    nodes[cursor].one
                } else {
                    nodes[cursor].zero
                };
                cursor = match next {
                    Some(index) => index as usize,
                    None => {
                        let index = nodes.len() as u32;
                        nodes.push(Node::default());
                        if bit {
                            nodes[cursor].one = Some(index);
                        } else {
                            nodes[cursor].zero = Some(index);
                        }
                        index as usize
                    }
                };
            }

            nodes[cursor].symbol = Some(symbol);
        }

        Self { nodes }
    }

    /// Returns a cursor positioned at the root.
    #[must_use]
    pub const fn root(&self) -> TrieCursor {
        TrieCursor(0)
    }

    /// Descends one level along `bit`, or `None` when no code continues
    /// down that edge.
    #[must_use]
    pub fn step(&self, cursor: TrieCursor, bit: bool) -> Option<TrieCursor> {
        let node = self.nodes[cursor.0 as usize];
        let next = if bit { node.one } else { node.zero };
        next.map(TrieCursor)
    }

    /// Returns the symbol terminating at `cursor`, when one does.
    #[must_use]
    pub fn symbol(&self, cursor: TrieCursor) -> Option<u8> {
        self.nodes[cursor.0 as usize].symbol
    }

    /// Number of nodes in the arena, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
