// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `EFI_TCG_PROTOCOL` (TPM 1.1 / 1.2) types.

use static_assertions::const_assert_eq;
use uefi::Guid;
use uefi::guid;
use zerocopy::FromBytes;
use zerocopy::FromZeros;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;

/// `EFI_TCG_PROTOCOL_GUID`
pub const PROTOCOL_GUID: Guid = guid!("f541796d-a62e-4954-a775-9584f61b9cdd");

/// `TCG_ALG_SHA`: the only hash algorithm a TPM 1.2 log accepts.
pub const TCG_ALG_SHA: u32 = 0x0000_0004;

/// 20-byte SHA-1 digest.
pub type Sha1Digest = [u8; 20];

/// `TCG_VERSION`
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
#[expect(missing_docs)] // self explanatory fields
pub struct TcgVersion {
    pub major: u8,
    pub minor: u8,
    pub rev_major: u8,
    pub rev_minor: u8,
}

/// `TCG_EFI_BOOT_SERVICE_CAPABILITY`, filled in by `StatusCheck`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct BootServiceCapability {
    /// Size of this structure, set by the caller.
    pub size: u8,
    /// Version of this structure.
    pub structure_version: TcgVersion,
    /// Version of the TCG EFI protocol spec the firmware implements.
    pub protocol_spec_version: TcgVersion,
    /// Supported hash algorithms. Always SHA-1 in practice.
    pub hash_algorithm_bitmap: u8,
    /// Non-zero when a TPM is present.
    pub tpm_present_flag: u8,
    /// Non-zero when the TPM is deactivated.
    pub tpm_deactivated_flag: u8,
}

const_assert_eq!(size_of::<BootServiceCapability>(), 12);

impl BootServiceCapability {
    /// Returns a zeroed capability structure with `size` filled in.
    pub fn new() -> Self {
        Self {
            size: size_of::<Self>() as u8,
            ..Self::new_zeroed()
        }
    }

    /// Whether the firmware reports a TPM device.
    pub fn tpm_present(&self) -> bool {
        self.tpm_present_flag != 0
    }

    /// Whether the TPM has been deactivated.
    pub fn tpm_deactivated(&self) -> bool {
        self.tpm_deactivated_flag != 0
    }
}

/// Fixed header of `TCG_PCR_EVENT`. `event_size` bytes of event data follow.
#[repr(C, packed)]
#[derive(Debug, Copy, Clone, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct PcrEventHeader {
    /// PCR to extend.
    pub pcr_index: u32,
    /// `EV_*` event type.
    pub event_type: u32,
    /// Filled in by the firmware when it hashes the measured data.
    pub digest: Sha1Digest,
    /// Number of event data bytes following the header.
    pub event_size: u32,
}

/// Size of [`PcrEventHeader`].
pub const PCR_EVENT_HEADER_SIZE: usize = size_of::<PcrEventHeader>();

const_assert_eq!(PCR_EVENT_HEADER_SIZE, 32);
