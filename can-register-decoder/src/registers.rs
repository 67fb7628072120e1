//! Known Bamocar motor controller registers
//!
//! Readings carry a raw register id byte. This table gives the ids the
//! gateway firmware requests or forwards a name; unknown ids stay numeric.

use serde::Serialize;
use std::fmt;

/// Bamocar register ids seen on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Register {
    SpeedActual = 0x30,
    DigitalSpeedSet = 0x31,
    /// Read request / cyclic transmit command
    Read = 0x3D,
    MotorTemp = 0x49,
    ControllerTemp = 0x4A,
    CurrentPhase1 = 0x54,
    CurrentPhase2 = 0x55,
    CurrentPhase3 = 0x56,
    SpeedNominal = 0x59,
    Current = 0x5F,
    Voltage = 0x8A,
    DigitalTorqueSet = 0x90,
    SpeedFiltered = 0xA8,
}

impl Register {
    /// Every known register, ordered by id
    pub const ALL: [Register; 13] = [
        Register::SpeedActual,
        Register::DigitalSpeedSet,
        Register::Read,
        Register::MotorTemp,
        Register::ControllerTemp,
        Register::CurrentPhase1,
        Register::CurrentPhase2,
        Register::CurrentPhase3,
        Register::SpeedNominal,
        Register::Current,
        Register::Voltage,
        Register::DigitalTorqueSet,
        Register::SpeedFiltered,
    ];

    /// Register id byte as sent on the bus
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Register> {
        Self::ALL.iter().copied().find(|reg| reg.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::SpeedActual => "SpeedActual",
            Register::DigitalSpeedSet => "DigitalSpeedSet",
            Register::Read => "Read",
            Register::MotorTemp => "MotorTemp",
            Register::ControllerTemp => "ControllerTemp",
            Register::CurrentPhase1 => "CurrentPhase1",
            Register::CurrentPhase2 => "CurrentPhase2",
            Register::CurrentPhase3 => "CurrentPhase3",
            Register::SpeedNominal => "SpeedNominal",
            Register::Current => "Current",
            Register::Voltage => "Voltage",
            Register::DigitalTorqueSet => "DigitalTorqueSet",
            Register::SpeedFiltered => "SpeedFiltered",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
