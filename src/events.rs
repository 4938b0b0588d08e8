use std::time::Instant;

/// One note as the session records it: the pitch and the time elapsed
/// since the previous note-relevant event (inter-onset duration, seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub duration: f32,
}

impl NoteEvent {
    pub fn new(pitch: u8, duration: f32) -> Self {
        Self { pitch, duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
}

impl MidiMessage {
    /// Parse a raw MIDI channel message. Note-on with velocity 0 counts as
    /// a note-off.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }
        match bytes[0] & 0xF0 {
            0x90 if bytes[2] > 0 => Some(MidiMessage::NoteOn {
                pitch: bytes[1],
                velocity: bytes[2],
            }),
            0x80 | 0x90 => Some(MidiMessage::NoteOff { pitch: bytes[1] }),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        match self {
            MidiMessage::NoteOn { pitch, velocity } => [0x90, pitch & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff { pitch } => [0x80, pitch & 0x7F, 0],
        }
    }
}

/// A parsed input message stamped with its capture time, as pushed from the
/// MIDI callback into the engine's event queue.
#[derive(Debug, Clone, Copy)]
pub struct InputEvent {
    pub message: MidiMessage,
    pub timestamp: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on() {
        let msg = MidiMessage::from_bytes(&[0x90, 60, 100]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                pitch: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn note_on_velocity_zero_is_note_off() {
        let msg = MidiMessage::from_bytes(&[0x90, 60, 0]).unwrap();
        assert_eq!(msg, MidiMessage::NoteOff { pitch: 60 });
    }

    #[test]
    fn parses_note_off() {
        let msg = MidiMessage::from_bytes(&[0x80, 64, 40]).unwrap();
        assert_eq!(msg, MidiMessage::NoteOff { pitch: 64 });
    }

    #[test]
    fn ignores_other_status_bytes() {
        assert!(MidiMessage::from_bytes(&[0xB0, 1, 64]).is_none());
        assert!(MidiMessage::from_bytes(&[0x90, 60]).is_none());
        assert!(MidiMessage::from_bytes(&[]).is_none());
    }

    #[test]
    fn round_trips_to_bytes() {
        let on = MidiMessage::NoteOn {
            pitch: 52,
            velocity: 64,
        };
        assert_eq!(on.to_bytes(), [0x90, 52, 64]);
        let off = MidiMessage::NoteOff { pitch: 52 };
        assert_eq!(off.to_bytes(), [0x80, 52, 0]);
    }
}
