// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Confirms an opened TPM interface is backed by a usable device.

use crate::NoTpmReason;
use crate::locate::OpenTpm;
use log::debug;
use tcg_efi_defs::v1;
use tcg_efi_defs::v2;
use uefi::Status;

/// Device state reported by the capability query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CapabilityReport {
    /// The firmware reports a TPM.
    pub present: bool,
    /// The TPM is deactivated. Always false for TCG2, which has no such flag.
    pub deactivated: bool,
}

impl CapabilityReport {
    /// Whether commands may be sent to the device.
    pub fn usable(&self) -> bool {
        self.present && !self.deactivated
    }
}

/// Query the device capability. Never cached, since TPM state can change
/// between calls.
pub(crate) fn query(tpm: &mut OpenTpm<'_>) -> Result<CapabilityReport, Status> {
    match tpm {
        OpenTpm::V1(tcg) => {
            let mut caps = v1::BootServiceCapability::new();
            let status = tcg.status_check(&mut caps);
            if status != Status::SUCCESS {
                return Err(status);
            }
            debug!(
                "TCG capability: structure {}.{}, protocol {}.{}, present {}, deactivated {}",
                caps.structure_version.major,
                caps.structure_version.minor,
                caps.protocol_spec_version.major,
                caps.protocol_spec_version.minor,
                caps.tpm_present_flag,
                caps.tpm_deactivated_flag,
            );
            Ok(CapabilityReport {
                present: caps.tpm_present(),
                deactivated: caps.tpm_deactivated(),
            })
        }
        OpenTpm::V2(tcg2) => {
            let mut caps = v2::BootServiceCapability::new();
            let status = tcg2.get_capability(&mut caps);
            if status != Status::SUCCESS {
                return Err(status);
            }
            debug!(
                "TCG2 capability: manufacturer {:#x}, max command {}, max response {}, active banks {:#x}, present {}",
                caps.manufacturer_id,
                caps.max_command_size,
                caps.max_response_size,
                caps.active_pcr_banks,
                caps.tpm_present_flag,
            );
            Ok(CapabilityReport {
                present: caps.tpm_present(),
                deactivated: false,
            })
        }
    }
}

/// Require the device to be present and, for TCG, not deactivated.
pub(crate) fn validate(tpm: &mut OpenTpm<'_>) -> Result<CapabilityReport, NoTpmReason> {
    let generation = tpm.generation();
    let failed = |code| NoTpmReason::CapabilityQueryFailed {
        generation,
        status: code,
    };
    let report = query(tpm).map_err(failed)?;
    if !report.present {
        return Err(NoTpmReason::NotPresent(generation));
    }
    if report.deactivated {
        return Err(NoTpmReason::Deactivated);
    }
    Ok(report)
}
