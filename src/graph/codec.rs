//! Serialized word graph format
//!
//! ```text
//! "DAWG" | edge_count: u32 LE | edge_count x u32 LE
//! ```
//!
//! Entry 0 points at the root's edge run. Every other entry is one edge:
//!
//! | bits  | field                                        |
//! |-------|----------------------------------------------|
//! | 0-7   | letter (`A`-`Z`)                             |
//! | 8     | target node is terminal                      |
//! | 9     | last edge of its run                         |
//! | 10-31 | first entry of the target's run, 0 = no edges |
//!
//! Runs list a node's edges in ascending letter order.

use super::dawg::{Dawg, Edge, Node, NodeId};
use crate::error::{LexiconError, Result};
use crate::utils::{crc16, u32_at, write_u32_le};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

const MAGIC: &[u8; 4] = b"DAWG";
const HEADER_LEN: usize = 8;

const TERMINAL_BIT: u32 = 1 << 8;
const LAST_BIT: u32 = 1 << 9;
const CHILD_SHIFT: u32 = 10;
const MAX_ENTRIES: usize = 1 << (32 - CHILD_SHIFT);

/// Deepest word accepted while decoding
const MAX_DEPTH: usize = 64;

/// CRC-16/X-25 of a serialized graph
pub fn checksum(bytes: &[u8]) -> u16 {
    crc16(bytes)
}

/// Serialize a graph; the result decodes to the same word set
pub fn encode(dawg: &Dawg) -> Result<Vec<u8>> {
    let nodes = dawg.nodes();

    // Assign runs breadth-first so the root's run comes first
    let mut run_start: FxHashMap<NodeId, u32> = FxHashMap::default();
    let mut order: Vec<NodeId> = Vec::new();
    let mut queue = VecDeque::from([dawg.root()]);
    let mut next_free: usize = 1;

    while let Some(id) = queue.pop_front() {
        let node = &nodes[id as usize];
        if node.edges.is_empty() || run_start.contains_key(&id) {
            continue;
        }
        run_start.insert(id, next_free as u32);
        order.push(id);
        next_free += node.edges.len();
        if next_free > MAX_ENTRIES {
            return Err(LexiconError::Format(format!(
                "graph needs more than {} edges",
                MAX_ENTRIES - 1
            )));
        }
        queue.extend(node.edges.iter().map(|e| e.target));
    }

    let mut out = Vec::with_capacity(HEADER_LEN + next_free * 4);
    out.extend_from_slice(MAGIC);
    write_u32_le(&mut out, next_free as u32).map_err(|e| LexiconError::Format(e.to_string()))?;

    let root_run = run_start.get(&dawg.root()).copied().unwrap_or(0);
    write_u32_le(&mut out, root_run << CHILD_SHIFT)
        .map_err(|e| LexiconError::Format(e.to_string()))?;

    for id in order {
        let edges = &nodes[id as usize].edges;
        for (i, edge) in edges.iter().enumerate() {
            let target = &nodes[edge.target as usize];
            let mut entry = edge.letter as u32;
            if target.terminal {
                entry |= TERMINAL_BIT;
            }
            if i + 1 == edges.len() {
                entry |= LAST_BIT;
            }
            entry |= run_start.get(&edge.target).copied().unwrap_or(0) << CHILD_SHIFT;
            write_u32_le(&mut out, entry).map_err(|e| LexiconError::Format(e.to_string()))?;
        }
    }

    Ok(out)
}

/// Decode a serialized graph, rejecting truncated, cyclic or out-of-order input
pub fn decode(bytes: &[u8]) -> Result<Dawg> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(LexiconError::Format("missing DAWG header".to_string()));
    }
    let count = u32_at(bytes, 1).unwrap_or(0) as usize;
    let body = &bytes[HEADER_LEN..];
    if count == 0 || body.len() != count * 4 {
        return Err(LexiconError::Format(format!(
            "expected {} edges, found {} bytes",
            count,
            body.len()
        )));
    }

    let mut decoder = Decoder {
        body,
        count,
        nodes: Vec::new(),
        memo: FxHashMap::default(),
        visiting: FxHashSet::default(),
    };

    let root_run = entry(body, 0)? >> CHILD_SHIFT;
    let root = decoder.node(root_run, false, 0)?;

    // Children are always pushed before their parents
    let mut words = vec![0usize; decoder.nodes.len()];
    for (i, node) in decoder.nodes.iter().enumerate() {
        let below = node
            .edges
            .iter()
            .fold(0usize, |sum, e| sum.saturating_add(words[e.target as usize]));
        words[i] = below.saturating_add(usize::from(node.terminal));
    }
    let word_count = words[root as usize];

    Ok(Dawg::from_parts(decoder.nodes, root, word_count))
}

fn entry(body: &[u8], index: usize) -> Result<u32> {
    u32_at(body, index).ok_or_else(|| LexiconError::Format(format!("edge {} out of range", index)))
}

struct Decoder<'a> {
    body: &'a [u8],
    count: usize,
    nodes: Vec<Node>,
    memo: FxHashMap<(u32, bool), NodeId>,
    visiting: FxHashSet<u32>,
}

impl Decoder<'_> {
    fn node(&mut self, run: u32, terminal: bool, depth: usize) -> Result<NodeId> {
        if let Some(&id) = self.memo.get(&(run, terminal)) {
            return Ok(id);
        }
        if depth > MAX_DEPTH {
            return Err(LexiconError::Format(format!(
                "word longer than {} letters",
                MAX_DEPTH
            )));
        }

        let mut edges = Vec::new();
        if run != 0 {
            if !self.visiting.insert(run) {
                return Err(LexiconError::Format(format!("cycle through edge {}", run)));
            }

            let mut index = run as usize;
            let mut previous: Option<u8> = None;
            loop {
                if index >= self.count {
                    return Err(LexiconError::Format(format!("edge {} out of range", index)));
                }
                let raw = entry(self.body, index)?;
                let letter = (raw & 0xFF) as u8;
                if !letter.is_ascii_uppercase() || previous.is_some_and(|p| p >= letter) {
                    return Err(LexiconError::Format(format!("bad letter at edge {}", index)));
                }
                previous = Some(letter);

                let target = self.node(raw >> CHILD_SHIFT, raw & TERMINAL_BIT != 0, depth + 1)?;
                edges.push(Edge { letter, target });

                if raw & LAST_BIT != 0 {
                    break;
                }
                index += 1;
            }

            self.visiting.remove(&run);
        }

        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::frozen(edges, terminal));
        self.memo.insert((run, terminal), id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(words: &[&str]) -> Dawg {
        let mut dawg = Dawg::new();
        for w in words {
            dawg.insert(w.as_bytes());
        }
        dawg.minimize();
        dawg
    }

    #[test]
    fn test_roundtrip_preserves_words() {
        let dawg = build(&["CAT", "CATS", "COT", "CUT", "DOG", "DOGS"]);
        let bytes = encode(&dawg).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.words(), dawg.words());
        assert_eq!(decoded.word_count(), 6);
    }

    #[test]
    fn test_empty_graph() {
        let bytes = encode(&Dawg::new()).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_rejects_truncated() {
        let bytes = encode(&build(&["CAT"])).unwrap();
        assert!(decode(&bytes[..bytes.len() - 1]).is_err());
        assert!(decode(b"DAW").is_err());
        assert!(decode(b"XXXX\x01\x00\x00\x00\x00\x00\x00\x00").is_err());
    }

    #[test]
    fn test_rejects_cycle() {
        // root run 1 holds a single 'A' edge leading back to run 1
        let mut bytes = MAGIC.to_vec();
        for word in [2u32, 1 << CHILD_SHIFT, (1 << CHILD_SHIFT) | LAST_BIT | b'A' as u32] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_decoded_graph_accepts_inserts() {
        let bytes = encode(&build(&["BAKE", "CAKE"])).unwrap();
        let mut dawg = decode(&bytes).unwrap();
        dawg.insert(b"BAKED");
        assert!(dawg.contains(b"BAKED"));
        assert!(!dawg.contains(b"CAKED"));
    }

    #[test]
    fn test_checksum_detects_change() {
        let bytes = encode(&build(&["CAT"])).unwrap();
        let mut altered = bytes.clone();
        let last = altered.len() - 4;
        altered[last] ^= 1;
        assert_ne!(checksum(&bytes), checksum(&altered));
    }
}
