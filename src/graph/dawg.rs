//! Arena-backed word graph with shared suffixes.
//!
//! Nodes live in a flat table and refer to each other by index. After
//! [`Dawg::minimize`] every node is *frozen*: it may be shared by several
//! parents and is never mutated again. [`Dawg::insert`] copies frozen nodes
//! along the insertion path before touching them, so an unfrozen node always
//! has exactly one parent and can be edited in place.

use rustc_hash::FxHashMap;

/// Index of a node in the arena
pub type NodeId = u32;

/// Outgoing edge labelled with one upper-case letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub letter: u8,
    pub target: NodeId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    /// Sorted by letter, no duplicates
    pub(crate) edges: Vec<Edge>,
    pub(crate) terminal: bool,
    frozen: bool,
}

impl Node {
    pub(crate) fn frozen(edges: Vec<Edge>, terminal: bool) -> Self {
        Self {
            edges,
            terminal,
            frozen: true,
        }
    }
}

/// Directed acyclic word graph over an explicit node table
#[derive(Debug, Clone)]
pub struct Dawg {
    nodes: Vec<Node>,
    root: NodeId,
    word_count: usize,
}

impl Default for Dawg {
    fn default() -> Self {
        Self::new()
    }
}

impl Dawg {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            root: 0,
            word_count: 0,
        }
    }

    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId, word_count: usize) -> Self {
        Self {
            nodes,
            root,
            word_count,
        }
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes[node as usize].terminal
    }

    #[inline]
    pub fn edges(&self, node: NodeId) -> &[Edge] {
        &self.nodes[node as usize].edges
    }

    /// Follow the edge labelled `letter`, if any
    #[inline]
    pub fn child(&self, node: NodeId, letter: u8) -> Option<NodeId> {
        let edges = self.edges(node);
        edges
            .binary_search_by_key(&letter, |e| e.letter)
            .ok()
            .map(|i| edges[i].target)
    }

    /// Node reached by spelling `word` from the root
    pub fn walk(&self, word: &[u8]) -> Option<NodeId> {
        word.iter()
            .try_fold(self.root, |node, &letter| self.child(node, letter))
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        !word.is_empty() && self.walk(word).is_some_and(|n| self.is_terminal(n))
    }

    /// Number of distinct words accepted
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Number of nodes in the arena, including unreachable garbage before minimization
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Insert a word; returns false if it was already present or empty
    pub fn insert(&mut self, word: &[u8]) -> bool {
        if word.is_empty() || self.contains(word) {
            return false;
        }

        self.root = self.thaw(self.root);
        let mut current = self.root;

        for &letter in word {
            let slot = self.nodes[current as usize]
                .edges
                .binary_search_by_key(&letter, |e| e.letter);
            current = match slot {
                Ok(pos) => {
                    let target = self.nodes[current as usize].edges[pos].target;
                    let thawed = self.thaw(target);
                    if thawed != target {
                        self.nodes[current as usize].edges[pos].target = thawed;
                    }
                    thawed
                }
                Err(pos) => {
                    let id = self.push(Node::default());
                    self.nodes[current as usize]
                        .edges
                        .insert(pos, Edge { letter, target: id });
                    id
                }
            };
        }

        self.nodes[current as usize].terminal = true;
        self.word_count += 1;
        true
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    /// Return a node that is safe to mutate: the node itself if unfrozen, else a private copy
    fn thaw(&mut self, id: NodeId) -> NodeId {
        if !self.nodes[id as usize].frozen {
            return id;
        }
        let mut copy = self.nodes[id as usize].clone();
        copy.frozen = false;
        self.push(copy)
    }

    /// Merge every pair of nodes with identical right languages and drop
    /// unreachable nodes. All surviving nodes are frozen.
    pub fn minimize(&mut self) {
        let mut registry: FxHashMap<(bool, Vec<Edge>), NodeId> = FxHashMap::default();
        let mut remap = vec![NodeId::MAX; self.nodes.len()];
        let mut nodes = Vec::new();

        let root = self.canonicalize(self.root, &mut registry, &mut remap, &mut nodes);

        self.nodes = nodes;
        self.root = root;
    }

    fn canonicalize(
        &self,
        id: NodeId,
        registry: &mut FxHashMap<(bool, Vec<Edge>), NodeId>,
        remap: &mut [NodeId],
        nodes: &mut Vec<Node>,
    ) -> NodeId {
        if remap[id as usize] != NodeId::MAX {
            return remap[id as usize];
        }

        let node = &self.nodes[id as usize];
        let edges: Vec<Edge> = node
            .edges
            .iter()
            .map(|e| Edge {
                letter: e.letter,
                target: self.canonicalize(e.target, registry, remap, nodes),
            })
            .collect();

        let key = (node.terminal, edges);
        let canonical = match registry.get(&key) {
            Some(&existing) => existing,
            None => {
                let new_id = nodes.len() as NodeId;
                nodes.push(Node::frozen(key.1.clone(), key.0));
                registry.insert(key, new_id);
                new_id
            }
        };

        remap[id as usize] = canonical;
        canonical
    }

    /// Visit every word in lexicographic order
    pub fn for_each_word<F: FnMut(&[u8])>(&self, mut visit: F) {
        let mut path = Vec::new();
        self.collect_from(self.root, &mut path, &mut visit);
    }

    fn collect_from<F: FnMut(&[u8])>(&self, node: NodeId, path: &mut Vec<u8>, visit: &mut F) {
        if self.is_terminal(node) && !path.is_empty() {
            visit(path);
        }
        for edge in self.edges(node) {
            path.push(edge.letter);
            self.collect_from(edge.target, path, visit);
            path.pop();
        }
    }

    /// All words in lexicographic order
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(self.word_count);
        self.for_each_word(|w| words.push(String::from_utf8_lossy(w).into_owned()));
        words
    }
}
