use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::Error;

/// Where generated notes take their durations from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationPolicy {
    /// Cycle through the seed's inter-onset durations.
    FromSeed,
    /// Keep the duration each sampled continuation was trained with.
    FromTraining,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pause length (seconds) after which a Train -> Generate -> Play cycle fires.
    pub silence_threshold: f32,
    /// Cap on generated notes per cycle.
    pub max_continuation_length: usize,
    /// How many of the most recent performed notes seed the generation.
    pub seed_window: usize,
    /// Also train on the 11 non-trivial chromatic transpositions.
    pub key_transposition: bool,
    /// Also train on every in-range octave shift.
    pub octave_transposition: bool,
    pub duration_policy: DurationPolicy,
    /// Velocity for played-back notes.
    pub velocity: u8,
    /// Substring match against port names; first port when absent.
    pub input_port: Option<String>,
    pub output_port: Option<String>,
    /// Pin the sampling RNG for reproducible sessions; unseeded when absent.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence_threshold: 2.0,
            max_continuation_length: 10,
            seed_window: 2,
            key_transposition: false,
            octave_transposition: false,
            duration_policy: DurationPolicy::FromTraining,
            velocity: 64,
            input_port: None,
            output_port: None,
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let ron_string = fs::read_to_string(path)?;
        Ok(ron::from_str(&ron_string)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }
}
