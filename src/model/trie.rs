use std::collections::HashMap;

/// One observed "next note" for some context: the pitch that followed, with
/// the inter-onset duration it was played with. Duplicates are kept on
/// purpose; the multiset encodes empirical frequency for weighted sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Continuation {
    pub pitch: u8,
    pub duration: f32,
}

/// A node in the suffix trie. The path from a root down through `children`
/// spells a suffix of some trained sequence in reverse temporal order
/// (most recent note first), so deeper nodes represent longer, more
/// specific contexts.
#[derive(Debug, Clone)]
pub struct TrieNode {
    pub pitch: u8,
    children: HashMap<u8, TrieNode>,
    continuations: Vec<Continuation>,
}

impl TrieNode {
    fn new(pitch: u8) -> Self {
        Self {
            pitch,
            children: HashMap::new(),
            continuations: Vec::new(),
        }
    }

    pub fn child(&self, pitch: u8) -> Option<&TrieNode> {
        self.children.get(&pitch)
    }

    /// Find-or-create the child keyed by `pitch`.
    pub(crate) fn child_mut(&mut self, pitch: u8) -> &mut TrieNode {
        self.children.entry(pitch).or_insert_with(|| TrieNode::new(pitch))
    }

    pub(crate) fn record(&mut self, continuation: Continuation) {
        self.continuations.push(continuation);
    }

    /// Every continuation ever observed after the context this node spells,
    /// with multiplicity. Non-empty for any node reachable through the
    /// public API: training records a continuation at every node it visits.
    pub fn continuations(&self) -> &[Continuation] {
        &self.continuations
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// The learned memory: one tree per pitch ever observed immediately before
/// a continuation. Grows monotonically for the life of the session; nodes
/// and continuation entries are only ever added.
#[derive(Debug, Clone, Default)]
pub struct SuffixTrie {
    roots: HashMap<u8, TrieNode>,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_root(&self, pitch: u8) -> Option<&TrieNode> {
        self.roots.get(&pitch)
    }

    pub(crate) fn root_mut(&mut self, pitch: u8) -> &mut TrieNode {
        self.roots.entry(pitch).or_insert_with(|| TrieNode::new(pitch))
    }

    /// Number of distinct root pitches (diagnostics only).
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
