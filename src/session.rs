use std::time::Instant;

use crate::config::{Config, DurationPolicy};
use crate::events::{InputEvent, MidiMessage, NoteEvent};
use crate::model::{Continuation, Generator, SuffixTrie, Trainer};

/// Result of one silence-triggered cycle. An empty `response` means the
/// generator had no known continuation; the cycle is a no-op, not a failure.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Notes the performer played into this cycle.
    pub recorded: usize,
    /// The continuation to play back, durations already reattached.
    pub response: Vec<NoteEvent>,
}

/// Accumulates the performance, watches for silence, and sequences
/// Train -> Generate cycles over the session-lifetime trie.
///
/// The controller is single-threaded by design: the engine's poll loop owns
/// it outright and feeds it drained input events, so the trie never sees
/// concurrent mutation. Events that arrive while a response is playing stay
/// queued upstream and land in a fresh buffer on the next tick.
pub struct SessionController {
    config: Config,
    trie: SuffixTrie,
    trainer: Trainer,
    generator: Generator,
    recorded: Vec<NoteEvent>,
    last_event_time: Instant,
}

impl SessionController {
    pub fn new(config: Config) -> Self {
        let trainer = Trainer::new(config.key_transposition, config.octave_transposition);
        let generator = match config.rng_seed {
            Some(seed) => Generator::from_seed(seed),
            None => Generator::from_entropy(),
        };
        Self {
            config,
            trie: SuffixTrie::new(),
            trainer,
            generator,
            recorded: Vec::new(),
            last_event_time: Instant::now(),
        }
    }

    /// Feed one input event. A sounding note-on extends the recorded buffer
    /// with its inter-onset duration; a release only moves the clock so the
    /// next onset measures its elapsed time from here.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event.message {
            MidiMessage::NoteOn { pitch, velocity } if velocity > 0 => {
                let elapsed = event
                    .timestamp
                    .saturating_duration_since(self.last_event_time)
                    .as_secs_f32();
                self.recorded.push(NoteEvent::new(pitch, elapsed));
            }
            MidiMessage::NoteOn { .. } | MidiMessage::NoteOff { .. } => {}
        }
        self.last_event_time = event.timestamp;
    }

    /// Silence test, called on the engine's polling cadence. Fires one
    /// Train -> Generate cycle when the performer has paused long enough,
    /// clears the buffer and resumes listening.
    pub fn poll(&mut self, now: Instant) -> Option<CycleOutcome> {
        if self.recorded.is_empty() {
            return None;
        }
        let silence = now.saturating_duration_since(self.last_event_time);
        if silence.as_secs_f32() <= self.config.silence_threshold {
            return None;
        }

        let recorded = std::mem::take(&mut self.recorded);
        tracing::info!(
            notes = recorded.len(),
            roots = self.trie.len(),
            "silence detected, training"
        );
        self.trainer.train(&mut self.trie, &recorded);

        let seed_start = recorded.len().saturating_sub(self.config.seed_window);
        let seed = &recorded[seed_start..];
        let generated =
            self.generator
                .generate(&self.trie, seed, self.config.max_continuation_length);
        if generated.is_empty() {
            tracing::info!("no known continuation, skipping playback");
        }
        let response = self.reattach_durations(seed, generated);

        // The cycle consumed this take; the clock keeps running so the next
        // onset measures from the true last event.
        Some(CycleOutcome {
            recorded: recorded.len(),
            response,
        })
    }

    fn reattach_durations(&self, seed: &[NoteEvent], generated: Vec<Continuation>) -> Vec<NoteEvent> {
        match self.config.duration_policy {
            DurationPolicy::FromTraining => generated
                .into_iter()
                .map(|c| NoteEvent::new(c.pitch, c.duration))
                .collect(),
            DurationPolicy::FromSeed => generated
                .into_iter()
                .enumerate()
                .map(|(i, c)| NoteEvent::new(c.pitch, seed[i % seed.len()].duration))
                .collect(),
        }
    }

    /// Root count of the learned trie (diagnostics).
    pub fn vocabulary(&self) -> usize {
        self.trie.len()
    }

    pub fn set_silence_threshold(&mut self, secs: f32) {
        self.config.silence_threshold = secs;
    }
}
