// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Errors surfaced to callers of the TPM transport.

use thiserror::Error;
use uefi::Status;

/// A failed TPM operation.
///
/// A missing or disabled TPM is never reported through this type; see
/// [`TpmOutcome::NoTpm`](crate::TpmOutcome::NoTpm).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum TpmError {
    /// The firmware reported `EFI_DEVICE_ERROR`.
    #[error("command failed")]
    IoFailure,
    /// The request was rejected, either locally or by the firmware.
    #[error("bad argument: {0}")]
    BadArgument(BadArgumentReason),
    /// The firmware reported `EFI_NOT_FOUND`.
    #[error("TPM unavailable")]
    DeviceUnavailable,
    /// The firmware returned a status with no specific mapping.
    #[error("unknown TPM error: {0:?}")]
    UnknownDeviceError(Status),
    /// The event record buffer could not be allocated.
    #[error("cannot allocate TPM event buffer of {0} bytes")]
    OutOfMemory(usize),
}

/// Why a request was classified as [`TpmError::BadArgument`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum BadArgumentReason {
    /// The firmware reported `EFI_INVALID_PARAMETER`.
    #[error("invalid parameter")]
    InvalidParameter,
    /// The firmware reported `EFI_BUFFER_TOO_SMALL`.
    #[error("output buffer too small")]
    OutputBufferTooSmall,
    /// A parameter block is shorter than its own header.
    #[error("parameter block of {len} bytes cannot hold a {header} byte header")]
    TruncatedParamBlock {
        /// Bytes supplied.
        len: usize,
        /// Header size.
        header: usize,
    },
    /// A declared block length is smaller than the block header.
    #[error("declared block length {declared} is below the {header} byte header")]
    LengthBelowHeader {
        /// Length from the block header.
        declared: u16,
        /// Header size.
        header: usize,
    },
    /// A declared block length runs past the end of the supplied buffer.
    #[error("declared block length {declared} exceeds the {len} byte buffer")]
    LengthExceedsBuffer {
        /// Length from the block header.
        declared: u16,
        /// Bytes supplied.
        len: usize,
    },
    /// A command or response does not fit a 16-bit parameter block length.
    #[error("{0} bytes do not fit in a parameter block")]
    ParamBlockTooLarge(usize),
    /// The event description does not fit the record size fields.
    #[error("event description of {0} bytes is too large")]
    EventTooLarge(usize),
}
