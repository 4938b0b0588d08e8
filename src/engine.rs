use crossbeam::channel::{Receiver, Sender, TryRecvError, bounded};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::midi::{MidiIn, MidiOut};
use crate::playback;
use crate::session::SessionController;

/// Polling cadence of the control loop; also bounds silence-detection jitter.
const POLL_TICK: Duration = Duration::from_millis(10);
/// Capacity of the queue between the MIDI callback and the control loop.
const EVENT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    SetSilenceThreshold(f32),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum EngineUpdate {
    Connected { input: String, output: String },
    CycleCompleted { recorded: usize, generated: usize },
    Error { message: String },
}

pub struct EngineHandle {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<EngineUpdate>,
}

pub fn spawn_engine(config: Config) -> EngineHandle {
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();

    thread::spawn(move || {
        engine_thread(config, command_rx, update_tx);
    });

    EngineHandle {
        command_tx,
        update_rx,
    }
}

/// The engine thread owns everything: the input connection feeding the
/// bounded event queue, the session controller (and through it the trie),
/// and the producer side of the playback queue. Training and generation run
/// inline in the poll loop; only playback gets its own thread, so a long
/// response never blocks listening.
fn engine_thread(
    config: Config,
    command_rx: Receiver<EngineCommand>,
    update_tx: Sender<EngineUpdate>,
) {
    let (event_tx, event_rx) = bounded(EVENT_QUEUE_CAPACITY);

    let midi_in = match MidiIn::connect(config.input_port.as_deref(), event_tx) {
        Ok(conn) => conn,
        Err(e) => {
            let _ = update_tx.send(EngineUpdate::Error {
                message: format!("Failed to open MIDI input: {e}"),
            });
            return;
        }
    };
    let midi_out = match MidiOut::connect(config.output_port.as_deref()) {
        Ok(conn) => conn,
        Err(e) => {
            let _ = update_tx.send(EngineUpdate::Error {
                message: format!("Failed to open MIDI output: {e}"),
            });
            return;
        }
    };

    tracing::info!(
        input = midi_in.port_name(),
        output = midi_out.port_name(),
        "connected"
    );
    let _ = update_tx.send(EngineUpdate::Connected {
        input: midi_in.port_name().to_string(),
        output: midi_out.port_name().to_string(),
    });

    let (mut note_producer, note_consumer) = playback::note_queue();
    let player = thread::spawn(move || playback::player_thread(note_consumer, midi_out));

    let velocity = config.velocity;
    let mut controller = SessionController::new(config);

    'running: loop {
        loop {
            match command_rx.try_recv() {
                Ok(EngineCommand::SetSilenceThreshold(secs)) => {
                    controller.set_silence_threshold(secs);
                }
                Ok(EngineCommand::Shutdown) | Err(TryRecvError::Disconnected) => break 'running,
                Err(TryRecvError::Empty) => break,
            }
        }

        for event in event_rx.try_iter() {
            controller.handle_event(event);
        }

        if let Some(outcome) = controller.poll(Instant::now()) {
            match playback::schedule_notes(&outcome.response, velocity, &mut note_producer) {
                Ok(()) => {
                    tracing::info!(
                        recorded = outcome.recorded,
                        generated = outcome.response.len(),
                        vocabulary = controller.vocabulary(),
                        "cycle complete"
                    );
                    let _ = update_tx.send(EngineUpdate::CycleCompleted {
                        recorded: outcome.recorded,
                        generated: outcome.response.len(),
                    });
                }
                Err(e) => {
                    // Cycle-level failure: drop this response, keep listening.
                    tracing::warn!("playback scheduling failed: {e}");
                    let _ = update_tx.send(EngineUpdate::Error {
                        message: format!("Playback scheduling failed: {e}"),
                    });
                }
            }
        }

        thread::sleep(POLL_TICK);
    }

    // Dropping the producer lets the player drain its queue and exit.
    drop(note_producer);
    drop(midi_in);
    let _ = player.join();
}
