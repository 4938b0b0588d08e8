mod generator;
mod trainer;
mod trie;

pub use generator::Generator;
pub use trainer::Trainer;
pub use trie::{Continuation, SuffixTrie, TrieNode};
