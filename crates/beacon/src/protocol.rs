//! Relay module command frames

/// Commands understood by the relay module driving the beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Close relay 1 (beacon on)
    Activate,
    /// Open relay 1 (beacon off)
    Deactivate,
}

const ACTIVATE: [u8; 3] = [254, 100, 1];
const DEACTIVATE: [u8; 3] = [254, 101, 1];

impl Command {
    pub const fn bytes(self) -> &'static [u8] {
        match self {
            Command::Activate => &ACTIVATE,
            Command::Deactivate => &DEACTIVATE,
        }
    }
}
