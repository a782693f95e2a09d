use crate::invoker::SmartctlInvoker;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage bus/transport families with distinct SMART reporting formats.
///
/// ATA and SCSI are the generic guesses smartctl produces; SATA, SAS and
/// SAT (a SATA drive behind a SAS port) are the refinements `classify`
/// can resolve them into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    Ata,
    Sata,
    Sat,
    Scsi,
    Sas,
    Nvme,
}

impl Interface {
    /// The `-d` device type smartctl expects for this interface.
    pub fn smartctl_type(self) -> &'static str {
        match self {
            Interface::Ata | Interface::Sata => "ata",
            Interface::Sat => "sat",
            Interface::Scsi | Interface::Sas => "scsi",
            Interface::Nvme => "nvme",
        }
    }

    /// True for the families whose dump follows the SCSI text layout
    /// (free-text counters, 20-entry self-test log).
    pub fn is_scsi_family(self) -> bool {
        self.smartctl_type() == "scsi"
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interface::Ata => "ata",
            Interface::Sata => "sata",
            Interface::Sat => "sat",
            Interface::Scsi => "scsi",
            Interface::Sas => "sas",
            Interface::Nvme => "nvme",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interface {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ata" | "atacam" => Ok(Interface::Ata),
            "sata" => Ok(Interface::Sata),
            "sat" => Ok(Interface::Sat),
            "scsi" => Ok(Interface::Scsi),
            "sas" => Ok(Interface::Sas),
            "nvme" => Ok(Interface::Nvme),
            _ => Err(()),
        }
    }
}

/// Hook invoked with identity lines (model, model family, WWN) during a
/// refresh. Deployments with vendor knowledge can register an
/// implementation that refines the interface from those lines; the
/// default classifies nothing.
pub trait ModelClassifier {
    fn classify(&self, line: &str) -> Option<Interface>;
}

/// Default hook: never reclassifies.
pub struct NoopClassifier;

impl ModelClassifier for NoopClassifier {
    fn classify(&self, _line: &str) -> Option<Interface> {
        None
    }
}

/// Disambiguate a generic ATA or SCSI guess into SATA, SAT or SAS using
/// read-only PHY-log probes. A nonzero probe exit is a negative answer,
/// never an error; an unresolvable device keeps the original guess.
pub fn classify(invoker: &dyn SmartctlInvoker, dev: &str, guess: Interface) -> Interface {
    let mut fine = guess;

    // A SATA PHY log answers for both directions: an "ATA" guess that has
    // one is SATA, a "SCSI" guess that has one is a SATA drive behind a
    // SAS port (SAT).
    if matches!(guess, Interface::Ata | Interface::Scsi) {
        let probe = if guess == Interface::Scsi { Interface::Sat } else { Interface::Sata };
        if let Ok((raw, 0)) = invoker.invoke(&["-d", probe.smartctl_type(), "-l", "sataphy", dev]) {
            if raw.get(3).is_some_and(|l| l.contains("GP Log 0x11")) {
                fine = probe;
            }
        }
    }

    if fine == Interface::Scsi {
        let sas = match invoker.invoke(&["-d", "scsi", "-l", "sasphy", dev]) {
            Ok((raw, 0)) if raw.get(4).is_some_and(|l| l.contains("SAS SSP")) => true,
            _ => {
                // Older SAS drives do not implement the SAS PHY log; fall
                // back to the transport-protocol field of a full dump.
                match invoker.invoke(&["-d", "scsi", "--all", dev]) {
                    Ok((raw, _)) => raw
                        .iter()
                        .any(|l| l.contains("Transport protocol") && l.contains("SAS")),
                    Err(_) => false,
                }
            }
        };
        if sas {
            fine = Interface::Sas;
        }
    }

    fine
}
