// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `EFI_TCG2_PROTOCOL` (TPM 2.0) types.

use bitfield_struct::bitfield;
use static_assertions::const_assert_eq;
use uefi::Guid;
use uefi::guid;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;

/// `EFI_TCG2_PROTOCOL_GUID`
pub const PROTOCOL_GUID: Guid = guid!("607f766c-7455-42be-930b-e4d76db2720f");

/// `EFI_TCG2_EVENT_HEADER_VERSION`
pub const EVENT_HEADER_VERSION: u16 = 1;

/// `EFI_TCG2_VERSION`
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[expect(missing_docs)] // self explanatory fields
pub struct Tcg2Version {
    pub major: u8,
    pub minor: u8,
}

/// `EFI_TCG2_BOOT_SERVICE_CAPABILITY`, filled in by `GetCapability`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BootServiceCapability {
    /// Size of this structure, set by the caller.
    pub size: u8,
    /// Version of this structure.
    pub structure_version: Tcg2Version,
    /// Version of the TCG2 protocol the firmware implements.
    pub protocol_version: Tcg2Version,
    /// `EFI_TCG2_BOOT_HASH_ALG_*` bits supported by the TPM.
    pub hash_algorithm_bitmap: u32,
    /// Event log formats the firmware can produce.
    pub supported_event_logs: u32,
    /// Non-zero when a TPM is present.
    pub tpm_present_flag: u8,
    /// Largest command accepted by `SubmitCommand`.
    pub max_command_size: u16,
    /// Largest response produced by `SubmitCommand`.
    pub max_response_size: u16,
    /// TCG vendor id of the TPM manufacturer.
    pub manufacturer_id: u32,
    /// Number of PCR banks the TPM supports.
    pub number_of_pcr_banks: u32,
    /// `EFI_TCG2_BOOT_HASH_ALG_*` bits currently active.
    pub active_pcr_banks: u32,
}

const_assert_eq!(size_of::<BootServiceCapability>(), 36);

impl BootServiceCapability {
    /// Returns a zeroed capability structure with `size` filled in.
    pub fn new() -> Self {
        Self {
            size: size_of::<Self>() as u8,
            ..Default::default()
        }
    }

    /// Whether the firmware reports a TPM device.
    pub fn tpm_present(&self) -> bool {
        self.tpm_present_flag != 0
    }
}

/// `EFI_TCG2_EVENT_HEADER`
#[repr(C, packed)]
#[derive(Debug, Copy, Clone, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct EventHeader {
    /// Size of this header.
    pub header_size: u32,
    /// Always [`EVENT_HEADER_VERSION`].
    pub header_version: u16,
    /// PCR to extend.
    pub pcr_index: u32,
    /// `EV_*` event type.
    pub event_type: u32,
}

/// Fixed portion of `EFI_TCG2_EVENT`. The event data follows.
#[repr(C, packed)]
#[derive(Debug, Copy, Clone, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct EventPrefix {
    /// Size of the whole record, event data included.
    pub size: u32,
    /// Event header.
    pub header: EventHeader,
}

/// Size of [`EventHeader`].
pub const EVENT_HEADER_SIZE: usize = size_of::<EventHeader>();

/// Size of [`EventPrefix`].
pub const EVENT_PREFIX_SIZE: usize = size_of::<EventPrefix>();

const_assert_eq!(EVENT_HEADER_SIZE, 14);
const_assert_eq!(EVENT_PREFIX_SIZE, 18);

/// Flags accepted by `HashLogExtendEvent`.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct HashLogExtendEventFlags {
    #[bits(4)]
    _reserved0: u8,
    /// `PE_COFF_IMAGE`: the data to hash is a PE/COFF image.
    pub pe_coff_image: bool,
    #[bits(59)]
    _reserved1: u64,
}
