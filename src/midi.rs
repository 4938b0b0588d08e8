use crossbeam::channel::Sender;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::Instant;

use crate::Error;
use crate::events::{InputEvent, MidiMessage};

const CLIENT_NAME: &str = "continuo";

/// Live input connection. Parsed note events flow into the engine's bounded
/// channel from the midir callback thread; dropping this closes the port.
pub struct MidiIn {
    port_name: String,
    _conn: MidiInputConnection<()>,
}

impl MidiIn {
    /// Connect to the first input port whose name contains `wanted`, or the
    /// first available port when no preference is given.
    pub fn connect(wanted: Option<&str>, event_tx: Sender<InputEvent>) -> Result<Self, Error> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let ports = midi_in.ports();
        let port = match wanted {
            Some(needle) => ports
                .iter()
                .find(|p| midi_in.port_name(p).unwrap_or_default().contains(needle)),
            None => ports.first(),
        }
        .ok_or(Error::NoPort("input"))?;
        let port_name = midi_in.port_name(port)?;

        let conn = midi_in
            .connect(
                port,
                "continuo-in",
                move |_, bytes, _| {
                    if let Some(message) = MidiMessage::from_bytes(bytes) {
                        let event = InputEvent {
                            message,
                            timestamp: Instant::now(),
                        };
                        if event_tx.try_send(event).is_err() {
                            tracing::warn!("input queue full, dropping {message:?}");
                        }
                    }
                },
                (),
            )
            .map_err(|e| Error::Connect {
                port: port_name.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            port_name,
            _conn: conn,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Output connection wrapper used by the player thread.
pub struct MidiOut {
    port_name: String,
    conn: MidiOutputConnection,
}

impl MidiOut {
    pub fn connect(wanted: Option<&str>) -> Result<Self, Error> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let ports = midi_out.ports();
        let port = match wanted {
            Some(needle) => ports
                .iter()
                .find(|p| midi_out.port_name(p).unwrap_or_default().contains(needle)),
            None => ports.first(),
        }
        .ok_or(Error::NoPort("output"))?;
        let port_name = midi_out.port_name(port)?;

        let conn = midi_out
            .connect(port, "continuo-out")
            .map_err(|e| Error::Connect {
                port: port_name.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { port_name, conn })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn send(&mut self, message: MidiMessage) -> Result<(), Error> {
        self.conn.send(&message.to_bytes())?;
        Ok(())
    }
}

/// Names of all currently visible MIDI ports, for `--list-ports`.
pub fn list_ports() -> Result<(Vec<String>, Vec<String>), Error> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    let inputs = midi_in
        .ports()
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_default())
        .collect();
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let outputs = midi_out
        .ports()
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_default())
        .collect();
    Ok((inputs, outputs))
}
