use std::path::PathBuf;

pub const USAGE: &str = "\
usage: pianokeys-ui [--verbose] [--dry-run] <command>

commands:
  --file PATH                play a MIDI file into the focused window
  --device NAME              forward a live MIDI input device
  --list-devices             print the MIDI input devices
  --set-hotkeys STOP PAUSE   change and save the stop/pause hotkeys
  --toggle-dark              flip and save the dark mode setting
  --help                     show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PlayFile(PathBuf),
    Listen(String),
    ListDevices,
    SetHotkeys { stop: String, pause: String },
    ToggleDark,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub verbose: bool,
    pub dry_run: bool,
    pub command: Command,
}

pub fn parse_args(args: &[String]) -> Result<Options, String> {
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let value_after = |flag: &str| -> Option<Result<String, String>> {
        args.iter().position(|a| a == flag).map(|i| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        })
    };

    let command = if args.iter().any(|a| a == "--help" || a == "-h") {
        Command::Help
    } else if let Some(path) = value_after("--file") {
        Command::PlayFile(PathBuf::from(path?))
    } else if let Some(device) = value_after("--device") {
        Command::Listen(device?)
    } else if args.iter().any(|a| a == "--list-devices") {
        Command::ListDevices
    } else if let Some(i) = args.iter().position(|a| a == "--set-hotkeys") {
        match (args.get(i + 1), args.get(i + 2)) {
            (Some(stop), Some(pause)) => Command::SetHotkeys {
                stop: stop.clone(),
                pause: pause.clone(),
            },
            _ => return Err("--set-hotkeys needs STOP and PAUSE".to_string()),
        }
    } else if args.iter().any(|a| a == "--toggle-dark") {
        Command::ToggleDark
    } else {
        return Err("no command given".to_string());
    };

    Ok(Options {
        verbose,
        dry_run,
        command,
    })
}
