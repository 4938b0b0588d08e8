use crate::events::NoteEvent;
use crate::model::trie::{Continuation, SuffixTrie};

/// Extends the trie with one performed sequence, optionally augmented with
/// pitch-transposed copies so a phrase learned in one key is recognized in
/// the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer {
    pub key_transposition: bool,
    pub octave_transposition: bool,
}

impl Trainer {
    pub fn new(key_transposition: bool, octave_transposition: bool) -> Self {
        Self {
            key_transposition,
            octave_transposition,
        }
    }

    pub fn train(&self, trie: &mut SuffixTrie, sequence: &[NoteEvent]) {
        self.train_all_keys(trie, sequence);
        if self.key_transposition {
            for semitones in 1..12 {
                if let Some(shifted) = transpose(sequence, semitones) {
                    self.train_all_keys(trie, &shifted);
                }
            }
        }
    }

    fn train_all_keys(&self, trie: &mut SuffixTrie, sequence: &[NoteEvent]) {
        train_sequence(trie, sequence);
        if self.octave_transposition {
            let mut octave = 1;
            while let Some(shifted) = transpose(sequence, octave * 12) {
                train_sequence(trie, &shifted);
                octave += 1;
            }
            let mut octave = -1;
            while let Some(shifted) = transpose(sequence, octave * 12) {
                train_sequence(trie, &shifted);
                octave -= 1;
            }
        }
    }
}

/// Index every suffix of `sequence` into the trie. For each split point `i`,
/// the reversed prefix `notes[i-1], notes[i-2], .., notes[0]` becomes a path
/// starting at the root for `notes[i-1]`, and `notes[i]` is recorded as one
/// weighted vote at every node along that path. Sequences of length 0 or 1
/// have no continuation to record and are ignored.
fn train_sequence(trie: &mut SuffixTrie, sequence: &[NoteEvent]) {
    for i in (1..sequence.len()).rev() {
        let continuation = Continuation {
            pitch: sequence[i].pitch,
            duration: sequence[i].duration,
        };
        let mut node = trie.root_mut(sequence[i - 1].pitch);
        node.record(continuation);
        for event in sequence[..i - 1].iter().rev() {
            node = node.child_mut(event.pitch);
            node.record(continuation);
        }
    }
}

/// Shift every pitch by `semitones`, or `None` if any note would leave the
/// MIDI range. Training on a clipped copy would corrupt the learned
/// contexts, so out-of-range transpositions are skipped whole.
fn transpose(sequence: &[NoteEvent], semitones: i32) -> Option<Vec<NoteEvent>> {
    sequence
        .iter()
        .map(|event| {
            let pitch = event.pitch as i32 + semitones;
            (0..=127)
                .contains(&pitch)
                .then(|| NoteEvent::new(pitch as u8, event.duration))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(pitches: &[u8]) -> Vec<NoteEvent> {
        pitches.iter().map(|&p| NoteEvent::new(p, 0.5)).collect()
    }

    fn pitches(conts: &[Continuation]) -> Vec<u8> {
        conts.iter().map(|c| c.pitch).collect()
    }

    #[test]
    fn four_note_sequence_builds_three_trees() {
        // [48, 50, 52, 53]: root 52 holds chain 52->50->48 continuing to 53,
        // root 50 holds 50->48 continuing to 52, root 48 continues to 50.
        let mut trie = SuffixTrie::new();
        Trainer::default().train(&mut trie, &seq(&[48, 50, 52, 53]));

        assert_eq!(trie.len(), 3);

        let root = trie.lookup_root(52).unwrap();
        assert_eq!(pitches(root.continuations()), [53]);
        let node = root.child(50).unwrap();
        assert_eq!(pitches(node.continuations()), [53]);
        let node = node.child(48).unwrap();
        assert_eq!(pitches(node.continuations()), [53]);
        assert!(!node.has_children());

        let root = trie.lookup_root(50).unwrap();
        assert_eq!(pitches(root.continuations()), [52]);
        assert_eq!(pitches(root.child(48).unwrap().continuations()), [52]);

        let root = trie.lookup_root(48).unwrap();
        assert_eq!(pitches(root.continuations()), [50]);
        assert!(!root.has_children());
    }

    #[test]
    fn second_sequence_accumulates_without_overwriting() {
        let mut trie = SuffixTrie::new();
        let trainer = Trainer::default();
        trainer.train(&mut trie, &seq(&[48, 50, 52, 53]));
        trainer.train(&mut trie, &seq(&[48, 50, 53, 55]));

        let root = trie.lookup_root(48).unwrap();
        assert_eq!(pitches(root.continuations()), [50, 50]);

        // Root 50 branches: 52 followed it in the first take, 53 in the second.
        let root = trie.lookup_root(50).unwrap();
        let mut observed = pitches(root.continuations());
        observed.sort_unstable();
        assert_eq!(observed, [52, 53]);
        assert!(root.child(48).is_some());
    }

    #[test]
    fn short_sequences_are_a_no_op() {
        let mut trie = SuffixTrie::new();
        let trainer = Trainer::default();
        trainer.train(&mut trie, &[]);
        trainer.train(&mut trie, &seq(&[60]));
        assert!(trie.is_empty());
    }

    #[test]
    fn key_transposition_covers_all_twelve_keys() {
        let mut trie = SuffixTrie::new();
        Trainer::new(true, false).train(&mut trie, &seq(&[60, 62]));
        for semitones in 0..12 {
            let root = trie.lookup_root(60 + semitones).unwrap();
            assert_eq!(pitches(root.continuations()), [62 + semitones]);
        }
        assert!(trie.lookup_root(72).is_none());
    }

    #[test]
    fn key_transposition_skips_out_of_range_copies() {
        let mut trie = SuffixTrie::new();
        Trainer::new(true, false).train(&mut trie, &seq(&[120, 121]));
        // +7 and up would push 121 past 127; only shifts 0..=6 trained.
        assert_eq!(trie.len(), 7);
        assert!(trie.lookup_root(126).is_some());
        assert!(trie.lookup_root(127).is_none());
    }

    #[test]
    fn octave_transposition_stays_in_range() {
        let mut trie = SuffixTrie::new();
        Trainer::new(false, true).train(&mut trie, &seq(&[60, 62]));
        // 60 +/- 12k with both notes in 0..=127: five octaves either way.
        for root in [0, 12, 24, 36, 48, 60, 72, 84, 96, 108, 120] {
            assert!(trie.lookup_root(root).is_some(), "missing octave root {root}");
        }
        assert_eq!(trie.len(), 11);
        assert!(trie.lookup_root(61).is_none());
    }

    #[test]
    fn trained_durations_ride_along() {
        let mut trie = SuffixTrie::new();
        let sequence = vec![NoteEvent::new(48, 0.5), NoteEvent::new(50, 0.25)];
        Trainer::default().train(&mut trie, &sequence);
        let cont = trie.lookup_root(48).unwrap().continuations()[0];
        assert_eq!(cont.pitch, 50);
        assert_eq!(cont.duration, 0.25);
    }
}
