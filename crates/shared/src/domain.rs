use serde::{Deserialize, Serialize};

use crate::protocol::Endpoint;

/// A user-triggered operation against the emulator backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Command {
    AssembleRom { source: String },
    AssembleFlash { source: String },
    RunCycle,
    Run,
    Reset,
    Flush,
}

impl Command {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Command::AssembleRom { .. } => Endpoint::AssembleRom,
            Command::AssembleFlash { .. } => Endpoint::AssembleFlash,
            Command::RunCycle => Endpoint::RunCycle,
            Command::Run => Endpoint::Run,
            Command::Reset => Endpoint::Reset,
            Command::Flush => Endpoint::Flush,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::AssembleRom { .. } => "assemble_rom",
            Command::AssembleFlash { .. } => "assemble_flash",
            Command::RunCycle => "run_cycle",
            Command::Run => "run",
            Command::Reset => "reset",
            Command::Flush => "flush",
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Command::AssembleRom { source } | Command::AssembleFlash { source } => Some(source),
            _ => None,
        }
    }

    /// Memory region an assemble command loads.
    pub fn target_region(&self) -> Option<MemoryRegion> {
        match self {
            Command::AssembleRom { .. } => Some(MemoryRegion::Rom),
            Command::AssembleFlash { .. } => Some(MemoryRegion::Flash),
            _ => None,
        }
    }

    /// Pane that receives the command's own reply, if any.
    pub fn target_pane(&self) -> Option<Pane> {
        self.target_region().map(Pane::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRegion {
    Rom,
    Ram,
    Flash,
}

impl From<MemoryRegion> for Pane {
    fn from(value: MemoryRegion) -> Self {
        match value {
            MemoryRegion::Rom => Pane::Rom,
            MemoryRegion::Ram => Pane::Ram,
            MemoryRegion::Flash => Pane::Flash,
        }
    }
}

/// One of the four display surfaces mirrored from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    Rom,
    Ram,
    Flash,
    Registers,
}

impl Pane {
    /// Refresh order used when issuing; completion order is unspecified.
    pub const ALL: [Pane; 4] = [Pane::Ram, Pane::Rom, Pane::Flash, Pane::Registers];

    pub fn refresh_endpoint(self) -> Endpoint {
        match self {
            Pane::Rom => Endpoint::Rom,
            Pane::Ram => Endpoint::Ram,
            Pane::Flash => Endpoint::Flash,
            Pane::Registers => Endpoint::Registers,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Pane::Rom => 0,
            Pane::Ram => 1,
            Pane::Flash => 2,
            Pane::Registers => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pane::Rom => "ROM",
            Pane::Ram => "RAM",
            Pane::Flash => "Flash",
            Pane::Registers => "Registers",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_assemble_commands_carry_source() {
        let rom = Command::AssembleRom {
            source: "MOV A,B".to_string(),
        };
        assert_eq!(rom.source(), Some("MOV A,B"));
        assert_eq!(rom.target_pane(), Some(Pane::Rom));
        assert_eq!(Command::Run.source(), None);
        assert_eq!(Command::Flush.target_pane(), None);
    }

    #[test]
    fn assemble_targets_map_region_to_pane() {
        let flash = Command::AssembleFlash {
            source: "HALT".to_string(),
        };
        assert_eq!(flash.target_region(), Some(MemoryRegion::Flash));
        assert_eq!(flash.target_pane(), Some(Pane::Flash));
        assert_eq!(Command::RunCycle.target_region(), None);
        assert_eq!(Pane::from(MemoryRegion::Ram), Pane::Ram);
    }

    #[test]
    fn pane_indices_are_distinct() {
        let mut seen = [false; 4];
        for pane in Pane::ALL {
            assert!(!seen[pane.index()]);
            seen[pane.index()] = true;
        }
    }

    #[test]
    fn command_serializes_with_tagged_payload() {
        let json = serde_json::to_value(Command::AssembleFlash {
            source: "HALT".to_string(),
        })
        .expect("serialize");
        assert_eq!(json["type"], "assemble_flash");
        assert_eq!(json["payload"]["source"], "HALT");
    }
}
