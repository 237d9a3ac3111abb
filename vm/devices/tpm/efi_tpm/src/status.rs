// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Maps firmware status codes onto [`TpmError`].
//!
//! Every hardware call in this crate finishes through [`translate`], so the
//! same status always produces the same result regardless of generation or
//! call site.

use crate::BadArgumentReason;
use crate::TpmError;
use uefi::Status;

/// Translate the status returned by a TPM protocol call.
pub fn translate(status: Status) -> Result<(), TpmError> {
    match status {
        Status::SUCCESS => Ok(()),
        Status::DEVICE_ERROR => Err(TpmError::IoFailure),
        Status::INVALID_PARAMETER => {
            Err(TpmError::BadArgument(BadArgumentReason::InvalidParameter))
        }
        Status::BUFFER_TOO_SMALL => {
            Err(TpmError::BadArgument(BadArgumentReason::OutputBufferTooSmall))
        }
        Status::NOT_FOUND => Err(TpmError::DeviceUnavailable),
        status => Err(TpmError::UnknownDeviceError(status)),
    }
}
