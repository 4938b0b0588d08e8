use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::events::NoteEvent;
use crate::model::trie::{Continuation, SuffixTrie};

/// Samples continuations from a trained trie, always preferring the longest
/// context the trie knows. Owns its random source so tests can pin a seed
/// and live sessions can run unseeded.
#[derive(Debug)]
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    /// Unseeded source for live use.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for reproducible output.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate up to `max_length` continuations of `seed`.
    ///
    /// Each step walks the tree rooted at the most recent pitch, descending
    /// while the next-older pitch in the rolling context matches a child.
    /// The walk stops at the deepest reachable node, so longer contexts
    /// always win over shorter ones with more support, and sampling from
    /// that node's multiset weights pitches by observed frequency.
    ///
    /// The context grows as notes are generated, but the descent depth stays
    /// bounded by the seed's original length. That bound is a deliberate
    /// carry-over: the lookback window never exceeds what the performer
    /// actually played.
    ///
    /// Stops early when the current pitch has no tree at all; an empty
    /// result means "no known continuation", not an error.
    pub fn generate(
        &mut self,
        trie: &SuffixTrie,
        seed: &[NoteEvent],
        max_length: usize,
    ) -> Vec<Continuation> {
        let mut context: Vec<u8> = seed.iter().map(|event| event.pitch).collect();
        let seed_len = context.len();
        let mut output = Vec::new();
        let Some(mut last) = context.last().copied() else {
            return output;
        };

        for _ in 0..max_length {
            let Some(mut node) = trie.lookup_root(last) else {
                break;
            };
            let mut depth = 2;
            while node.has_children() && depth < seed_len {
                match node.child(context[context.len() - depth]) {
                    Some(child) => {
                        node = child;
                        depth += 1;
                    }
                    None => break,
                }
            }
            let continuations = node.continuations();
            let next = continuations[self.rng.gen_range(0..continuations.len())];
            output.push(next);
            context.push(next.pitch);
            last = next.pitch;
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Trainer;

    fn seq(pitches: &[u8]) -> Vec<NoteEvent> {
        pitches.iter().map(|&p| NoteEvent::new(p, 0.5)).collect()
    }

    fn trained(sequences: &[&[u8]]) -> SuffixTrie {
        let mut trie = SuffixTrie::new();
        let trainer = Trainer::default();
        for pitches in sequences {
            trainer.train(&mut trie, &seq(pitches));
        }
        trie
    }

    fn generated_pitches(out: &[Continuation]) -> Vec<u8> {
        out.iter().map(|c| c.pitch).collect()
    }

    #[test]
    fn continues_the_trained_scale() {
        let trie = trained(&[&[48, 50, 52, 53]]);
        let out = Generator::from_seed(7).generate(&trie, &seq(&[48, 50]), 1);
        assert_eq!(generated_pitches(&out), [52]);
    }

    #[test]
    fn follows_the_branch_to_the_end() {
        let trie = trained(&[&[48, 50, 52, 53]]);
        let out = Generator::from_seed(7).generate(&trie, &seq(&[48, 50]), 10);
        // 52 then 53 are forced; 53 has no tree, so generation stops there.
        assert_eq!(generated_pitches(&out), [52, 53]);
    }

    #[test]
    fn unknown_root_yields_empty_result() {
        let trie = trained(&[&[48, 50, 52, 53]]);
        let out = Generator::from_seed(7).generate(&trie, &seq(&[90]), 10);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_seed_yields_empty_result() {
        let trie = trained(&[&[48, 50, 52, 53]]);
        let out = Generator::from_seed(7).generate(&trie, &[], 10);
        assert!(out.is_empty());
    }

    #[test]
    fn respects_max_length() {
        // 60 -> 62 -> 60 -> 62 loops forever without the cap.
        let trie = trained(&[&[60, 62, 60, 62, 60]]);
        let out = Generator::from_seed(7).generate(&trie, &seq(&[60, 62]), 5);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn longest_matching_suffix_wins() {
        // After context ..60,62 the only observed continuation is 64; after
        // the shorter context ..62 alone, 66 was also observed (twice, so it
        // would dominate a depth-1 sample). The depth-2 match must win.
        let trie = trained(&[&[60, 62, 64], &[65, 62, 66], &[65, 62, 66]]);
        let mut generator = Generator::from_seed(0);
        for _ in 0..20 {
            let out = generator.generate(&trie, &seq(&[59, 60, 62]), 1);
            assert_eq!(generated_pitches(&out), [64]);
        }
    }

    #[test]
    fn lookback_is_bounded_by_seed_length() {
        // Seed of length 2 never descends past depth 1, even after the
        // context has grown: with [48, 50] the walk samples straight from
        // root 50 without consulting the 48 behind it.
        let trie = trained(&[&[48, 50, 52], &[49, 50, 55]]);
        let mut seen = std::collections::HashSet::new();
        let mut generator = Generator::from_seed(3);
        for _ in 0..50 {
            let out = generator.generate(&trie, &seq(&[48, 50]), 1);
            seen.insert(generated_pitches(&out)[0]);
        }
        // Both branches reachable: the depth-2 context [50, 48] is never
        // required, so 55 (which only ever followed [50, 49]) shows up too.
        assert_eq!(seen, std::collections::HashSet::from([52, 55]));
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let trie = trained(&[&[60, 62, 64, 62, 60, 64, 67, 60]]);
        let seed = seq(&[60, 62, 64]);
        let first = Generator::from_seed(42).generate(&trie, &seed, 10);
        let second = Generator::from_seed(42).generate(&trie, &seed, 10);
        assert_eq!(generated_pitches(&first), generated_pitches(&second));
    }

    #[test]
    fn sampling_tracks_observed_frequency() {
        // 62 followed 60 three times, 64 once: roughly three quarters of
        // single-step samples should pick 62.
        let trie = trained(&[&[60, 62], &[60, 62], &[60, 62], &[60, 64]]);
        let mut generator = Generator::from_seed(11);
        let mut count_62 = 0;
        for _ in 0..400 {
            let out = generator.generate(&trie, &seq(&[60]), 1);
            if generated_pitches(&out) == [62] {
                count_62 += 1;
            }
        }
        assert!((240..=360).contains(&count_62), "got {count_62}/400");
    }
}
