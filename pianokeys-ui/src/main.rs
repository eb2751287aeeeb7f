mod cli;
mod platform;

use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use pianokeys_core::prelude::*;

use cli::{Command, Options};

/// How long the output loop waits for a line before checking the session.
const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pianokeys")
        .join("pianokeys.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/pianokeys.log")) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot create log file: {}", e);
            return;
        }
    };

    if let Err(e) = WriteLogger::init(log_level, Config::default(), log_file) {
        eprintln!("Failed to initialize logger: {}", e);
        return;
    }

    log::info!("pianokeys starting (log level: {:?})", log_level);
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}\n\n{}", e, cli::USAGE);
            return ExitCode::from(2);
        }
    };
    if options.command == Command::Help {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    init_logging(options.verbose);
    run(options)
}

fn run(options: Options) -> ExitCode {
    let mut settings = Settings::load();
    let (tx, lines) = crossbeam_channel::unbounded::<String>();
    let (simulator, keys) = platform::input_backends(options.dry_run);
    let hotkeys = Arc::new(HotkeyController::new(keys, settings.hotkeys()));
    let engine = Engine::new(
        Arc::new(SystemMidi::new()),
        simulator,
        hotkeys,
        Arc::new(ChannelSink::new(tx)),
    );

    let ok = match options.command {
        Command::PlayFile(path) => match engine.play_file(&path) {
            Ok(session) => match drain_session(session, &lines) {
                SessionOutcome::Playback(report) => report.state != PlaybackState::Failed,
                SessionOutcome::Listener(_) => true,
                SessionOutcome::Aborted | SessionOutcome::Crashed => false,
            },
            Err(_) => false,
        },
        Command::Listen(device) => match engine.listen(&device) {
            Ok(session) => !matches!(
                drain_session(session, &lines),
                SessionOutcome::Aborted | SessionOutcome::Crashed
            ),
            Err(_) => false,
        },
        Command::ListDevices => {
            for name in engine.devices() {
                println!("{}", name);
            }
            true
        }
        Command::SetHotkeys { stop, pause } => match engine.update_hotkeys(&stop, &pause) {
            Ok(config) => {
                settings.set_hotkeys(&config);
                save(&settings)
            }
            Err(_) => false,
        },
        Command::ToggleDark => {
            settings.dark_mode = !settings.dark_mode;
            println!("Dark mode {}.", if settings.dark_mode { "on" } else { "off" });
            save(&settings)
        }
        Command::Help => true,
    };

    print_pending(&lines);
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Echo session output until the worker ends, then collect its outcome.
fn drain_session(session: SessionHandle, lines: &Receiver<String>) -> SessionOutcome {
    loop {
        match lines.recv_timeout(DRAIN_INTERVAL) {
            Ok(line) => println!("{}", line),
            Err(RecvTimeoutError::Timeout) => {
                if session.is_finished() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    let outcome = session.join();
    print_pending(lines);
    log::debug!("session ended: {:?}", outcome);
    outcome
}

fn print_pending(lines: &Receiver<String>) {
    for line in lines.try_iter() {
        println!("{}", line);
    }
}

fn save(settings: &Settings) -> bool {
    match settings.save() {
        Ok(()) => true,
        Err(e) => {
            log::error!(target: "config", "could not save settings: {}", e);
            eprintln!("error: could not save settings: {}", e);
            false
        }
    }
}
