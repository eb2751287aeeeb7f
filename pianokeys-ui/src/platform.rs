//! Picks the keystroke and key-state backends for this build.

use std::sync::Arc;

use pianokeys_core::actuator::DryRunActuator;
use pianokeys_core::hotkeys::{KeyState, NoKeys};
use pianokeys_core::simulator::KeySimulator;

#[cfg(feature = "os-input")]
mod os;

pub fn input_backends(dry_run: bool) -> (KeySimulator, Arc<dyn KeyState>) {
    #[cfg(feature = "os-input")]
    {
        if !dry_run {
            match os::EnigoActuator::spawn() {
                Ok(actuator) => {
                    return (KeySimulator::new(actuator), Arc::new(os::PolledKeys::spawn()));
                }
                Err(e) => {
                    log::warn!(target: "keys", "keyboard injection unavailable: {}", e);
                    eprintln!("Keyboard injection unavailable ({}); running dry.", e);
                }
            }
        }
    }

    #[cfg(not(feature = "os-input"))]
    {
        if !dry_run {
            log::warn!(target: "keys", "built without the os-input feature; keystrokes are logged only");
            eprintln!("Built without the 'os-input' feature; keystrokes are logged only. Build with: cargo build --features os-input");
        }
    }

    (KeySimulator::new(DryRunActuator), Arc::new(NoKeys))
}
