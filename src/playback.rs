use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use std::thread;
use std::time::Duration;

use crate::Error;
use crate::events::{MidiMessage, NoteEvent};
use crate::midi::MidiOut;

/// One note queued for the player thread: sounded at `velocity` for
/// `duration` seconds, note-off before the next pop.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledNote {
    pub pitch: u8,
    pub velocity: u8,
    pub duration: f32,
}

pub type NoteProducer = HeapProd<ScheduledNote>;
pub type NoteConsumer = HeapCons<ScheduledNote>;

const QUEUE_CAPACITY: usize = 1024;
const IDLE_POLL: Duration = Duration::from_millis(5);

pub fn note_queue() -> (NoteProducer, NoteConsumer) {
    HeapRb::<ScheduledNote>::new(QUEUE_CAPACITY).split()
}

/// Push a generated sequence onto the player queue. A full queue aborts the
/// whole cycle; partially played continuations are worse than skipped ones.
pub fn schedule_notes(
    notes: &[NoteEvent],
    velocity: u8,
    producer: &mut NoteProducer,
) -> Result<(), Error> {
    if producer.vacant_len() < notes.len() {
        return Err(Error::PlaybackQueueFull);
    }
    for note in notes {
        let scheduled = ScheduledNote {
            pitch: note.pitch,
            velocity,
            duration: note.duration,
        };
        if producer.try_push(scheduled).is_err() {
            return Err(Error::PlaybackQueueFull);
        }
    }
    Ok(())
}

/// Player loop: owns the output connection, pops scheduled notes and emits
/// note-on / wait / note-off with the queued spacing. Runs until the
/// producer side is dropped and the queue has drained.
pub fn player_thread(mut consumer: NoteConsumer, mut output: MidiOut) {
    loop {
        match consumer.try_pop() {
            Some(note) => {
                if let Err(e) = play_note(&mut output, &note) {
                    tracing::error!("playback failed: {e}");
                }
            }
            None if !consumer.write_is_held() => break,
            None => thread::sleep(IDLE_POLL),
        }
    }
}

fn play_note(output: &mut MidiOut, note: &ScheduledNote) -> Result<(), Error> {
    output.send(MidiMessage::NoteOn {
        pitch: note.pitch,
        velocity: note.velocity,
    })?;
    thread::sleep(Duration::from_secs_f32(note.duration.max(0.0)));
    output.send(MidiMessage::NoteOff { pitch: note.pitch })
}
