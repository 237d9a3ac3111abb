// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Finds the TPM protocol interface published by the firmware.
//!
//! The TCG (TPM 1.2) protocol is preferred over TCG2, and the first handle
//! reported by the firmware wins. Nothing is cached: the handle set is only
//! meaningful for the duration of one enumeration.

use crate::NoTpmReason;
use crate::platform::Tcg2Protocol;
use crate::platform::TcgProtocol;
use crate::platform::TpmPlatform;
use alloc::boxed::Box;
use core::fmt;
use log::debug;
use tcg_efi_defs::v1;
use tcg_efi_defs::v2;
use uefi::Guid;
use uefi::Status;

/// Which TPM interface the firmware exposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProtocolGeneration {
    /// No TPM interface.
    None,
    /// `EFI_TCG_PROTOCOL`, pass-through style.
    V1,
    /// `EFI_TCG2_PROTOCOL`, command submission style.
    V2,
}

impl fmt::Display for ProtocolGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ProtocolGeneration::None => "none",
            ProtocolGeneration::V1 => "TCG (TPM 1.2)",
            ProtocolGeneration::V2 => "TCG2 (TPM 2.0)",
        })
    }
}

/// A located firmware handle, tagged with the protocol it implements.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TpmHandle<H> {
    /// Handle implementing `EFI_TCG_PROTOCOL`.
    V1(H),
    /// Handle implementing `EFI_TCG2_PROTOCOL`.
    V2(H),
}

impl<H> TpmHandle<H> {
    /// The protocol generation of this handle.
    pub fn generation(&self) -> ProtocolGeneration {
        match self {
            TpmHandle::V1(_) => ProtocolGeneration::V1,
            TpmHandle::V2(_) => ProtocolGeneration::V2,
        }
    }
}

/// Find the TPM handle to use, if any.
pub fn locate<P: TpmPlatform>(platform: &P) -> Option<TpmHandle<P::Handle>> {
    first_handle(platform, &v1::PROTOCOL_GUID)
        .map(TpmHandle::V1)
        .or_else(|| first_handle(platform, &v2::PROTOCOL_GUID).map(TpmHandle::V2))
}

fn first_handle<P: TpmPlatform>(platform: &P, protocol: &Guid) -> Option<P::Handle> {
    match platform.locate_handles(protocol) {
        Ok(handles) => handles.first().copied(),
        Err(Status::NOT_FOUND) => None,
        Err(status) => {
            debug!("locating {protocol} handles failed: {status:?}");
            None
        }
    }
}

/// An opened protocol interface for one operation.
pub(crate) enum OpenTpm<'a> {
    V1(Box<dyn TcgProtocol + 'a>),
    V2(Box<dyn Tcg2Protocol + 'a>),
}

impl OpenTpm<'_> {
    pub fn generation(&self) -> ProtocolGeneration {
        match self {
            OpenTpm::V1(_) => ProtocolGeneration::V1,
            OpenTpm::V2(_) => ProtocolGeneration::V2,
        }
    }
}

/// Open the protocol interface behind `handle`.
pub(crate) fn open<P: TpmPlatform>(
    platform: &P,
    handle: TpmHandle<P::Handle>,
) -> Result<OpenTpm<'_>, NoTpmReason> {
    let generation = handle.generation();
    let opened = match handle {
        TpmHandle::V1(handle) => platform.open_tcg(handle).map(OpenTpm::V1),
        TpmHandle::V2(handle) => platform.open_tcg2(handle).map(OpenTpm::V2),
    };
    opened.map_err(|status| NoTpmReason::OpenFailed { generation, status })
}
