use std::path::Path;
use std::process::ExitCode;

use continuo::{Config, EngineCommand, EngineUpdate, midi, spawn_engine};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--list-ports" => return list_ports(),
            "--help" | "-h" => {
                eprintln!("Usage: continuo [--list-ports] [config.ron]");
                return ExitCode::SUCCESS;
            }
            path => config_path = Some(path.to_string()),
        }
    }

    let config = match config_path {
        Some(path) => match Config::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let engine = spawn_engine(config);

    // Run until the engine reports a fatal setup error or stdin closes
    // (Ctrl-D / Enter to quit).
    let updates = engine.update_rx.clone();
    std::thread::spawn(move || {
        for update in updates.iter() {
            match update {
                EngineUpdate::Connected { input, output } => {
                    println!("Listening on '{input}', playing on '{output}'. Press Enter to quit.");
                }
                EngineUpdate::CycleCompleted { recorded, generated } => {
                    println!("Heard {recorded} notes, answered with {generated}.");
                }
                EngineUpdate::Error { message } => {
                    eprintln!("{message}");
                }
            }
        }
    });

    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    let _ = engine.command_tx.send(EngineCommand::Shutdown);
    ExitCode::SUCCESS
}

fn list_ports() -> ExitCode {
    match midi::list_ports() {
        Ok((inputs, outputs)) => {
            println!("MIDI inputs:");
            for (i, name) in inputs.iter().enumerate() {
                println!("  {i}: {name}");
            }
            println!("MIDI outputs:");
            for (i, name) in outputs.iter().enumerate() {
                println!("  {i}: {name}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to enumerate MIDI ports: {e}");
            ExitCode::FAILURE
        }
    }
}
