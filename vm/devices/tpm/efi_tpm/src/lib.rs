// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! TPM access for pre-boot UEFI code.
//!
//! [`TpmTransport`] discovers which TCG protocol the firmware publishes
//! (`EFI_TCG_PROTOCOL` for TPM 1.2, `EFI_TCG2_PROTOCOL` for TPM 2.0),
//! forwards raw TPM commands to it, and records measurement events in the
//! firmware event log.
//!
//! A machine without a TPM, or with a TPM the firmware reports as absent or
//! deactivated, is a supported configuration: every operation then returns
//! [`TpmOutcome::NoTpm`] without touching the hardware. Failures of an actual
//! hardware call are reported as [`TpmError`] and are never retried, since a
//! failed extend may still have changed PCR state.
//!
//! The firmware is reached through the [`TpmPlatform`] trait. [`uefi_tcg`]
//! implements it on top of the running firmware's boot services.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod command;
mod error;
mod event;
mod locate;
mod platform;
mod presence;
pub mod status;
pub mod uefi_tcg;

#[cfg(test)]
mod tests;

pub use command::CommandBlock;
pub use error::BadArgumentReason;
pub use error::TpmError;
pub use locate::ProtocolGeneration;
pub use locate::TpmHandle;
pub use locate::locate;
pub use platform::Tcg2Protocol;
pub use platform::TcgProtocol;
pub use platform::TpmPlatform;
pub use presence::CapabilityReport;

use alloc::vec::Vec;
use event::MeasurementEvent;
use locate::OpenTpm;
use log::debug;
use log::info;
use thiserror::Error;
use uefi::Status;

/// Why an operation was skipped without reaching the TPM.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum NoTpmReason {
    /// No handle implements either TCG protocol.
    #[error("no TPM device found")]
    NoHandle,
    /// A handle exists but its protocol interface could not be opened.
    #[error("failed to open the {generation} protocol: {status:?}")]
    OpenFailed {
        /// Protocol that was being opened.
        generation: ProtocolGeneration,
        /// Firmware status.
        status: Status,
    },
    /// The capability query failed.
    #[error("{generation} capability query failed: {status:?}")]
    CapabilityQueryFailed {
        /// Protocol that was queried.
        generation: ProtocolGeneration,
        /// Firmware status.
        status: Status,
    },
    /// The firmware reports no TPM behind the protocol.
    #[error("{0} reports no TPM present")]
    NotPresent(ProtocolGeneration),
    /// The TPM 1.2 device is deactivated.
    #[error("TPM is deactivated")]
    Deactivated,
}

/// Result of an operation that does not require a TPM to be present.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TpmOutcome<T> {
    /// The TPM executed the operation.
    Completed(T),
    /// The operation was skipped, with no side effects.
    NoTpm(NoTpmReason),
}

impl<T> TpmOutcome<T> {
    /// Returns the completed value, if the TPM executed the operation.
    pub fn completed(self) -> Option<T> {
        match self {
            TpmOutcome::Completed(value) => Some(value),
            TpmOutcome::NoTpm(_) => None,
        }
    }

    /// Whether the TPM executed the operation.
    pub fn is_completed(&self) -> bool {
        matches!(self, TpmOutcome::Completed(_))
    }
}

/// Entry point for TPM commands and measurements.
///
/// The TPM is located and validated again on every call; nothing about the
/// device is cached between operations.
#[derive(Debug)]
pub struct TpmTransport<P> {
    platform: P,
}

impl<P: TpmPlatform> TpmTransport<P> {
    /// Create a transport over `platform`.
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// The underlying platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Which TPM protocol the firmware currently publishes.
    pub fn generation(&self) -> ProtocolGeneration {
        locate(&self.platform).map_or(ProtocolGeneration::None, |handle| handle.generation())
    }

    /// Locate, open, and validate the TPM, then query its capability.
    pub fn capability(&self) -> TpmOutcome<CapabilityReport> {
        match self.acquire() {
            Ok((_, report)) => TpmOutcome::Completed(report),
            Err(reason) => TpmOutcome::NoTpm(reason),
        }
    }

    /// Forward the command in `block` to the TPM. The response operand is
    /// written into the output block.
    pub fn forward(&self, block: CommandBlock<'_>) -> Result<TpmOutcome<()>, TpmError> {
        self.with_tpm(|tpm| command::forward(tpm, block))
    }

    /// Send the raw TPM command `operand` and return the response, which may
    /// be at most `output_capacity` bytes.
    pub fn forward_command(
        &self,
        operand: &[u8],
        output_capacity: usize,
    ) -> Result<TpmOutcome<Vec<u8>>, TpmError> {
        self.with_tpm(|tpm| {
            let (input, mut output) = command::frame(operand, output_capacity)?;
            command::forward(tpm, CommandBlock::new(&input, &mut output))?;
            Ok(command::response(output))
        })
    }

    /// Measure `buffer` into PCR `pcr_index` and log it with `description`.
    ///
    /// `pcr_index` is passed to the firmware unchecked.
    pub fn log_measurement(
        &self,
        buffer: &[u8],
        pcr_index: u8,
        description: &str,
    ) -> Result<TpmOutcome<()>, TpmError> {
        let event = MeasurementEvent::new(pcr_index, description);
        self.with_tpm(|tpm| event::log_event(&self.platform, tpm, buffer, &event))
    }

    fn acquire(&self) -> Result<(OpenTpm<'_>, CapabilityReport), NoTpmReason> {
        let handle = locate(&self.platform).ok_or(NoTpmReason::NoHandle)?;
        let mut tpm = locate::open(&self.platform, handle)?;
        let report = presence::validate(&mut tpm)?;
        Ok((tpm, report))
    }

    fn with_tpm<T>(
        &self,
        f: impl FnOnce(&mut OpenTpm<'_>) -> Result<T, TpmError>,
    ) -> Result<TpmOutcome<T>, TpmError> {
        let mut tpm = match self.acquire() {
            Ok((tpm, _)) => tpm,
            Err(NoTpmReason::NoHandle) => {
                info!("no TPM device found");
                return Ok(TpmOutcome::NoTpm(NoTpmReason::NoHandle));
            }
            Err(reason) => {
                debug!("skipping TPM operation: {reason}");
                return Ok(TpmOutcome::NoTpm(reason));
            }
        };
        f(&mut tpm).map(TpmOutcome::Completed)
    }
}
