// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The firmware surface this crate drives.
//!
//! [`TpmPlatform`] is the handle directory, [`TcgProtocol`] and
//! [`Tcg2Protocol`] are the two protocol tables. The real implementation
//! lives in [`crate::uefi_tcg`]; tests substitute recording mocks.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use tcg_efi_defs::v1;
use tcg_efi_defs::v2;
use uefi::Guid;
use uefi::Status;

/// Handle enumeration and protocol lookup.
pub trait TpmPlatform {
    /// Opaque firmware handle.
    type Handle: Copy + Debug;

    /// Returns every handle that implements `protocol`, in firmware
    /// enumeration order.
    fn locate_handles(&self, protocol: &Guid) -> Result<Vec<Self::Handle>, Status>;

    /// Open the `EFI_TCG_PROTOCOL` interface on `handle`.
    fn open_tcg(&self, handle: Self::Handle) -> Result<Box<dyn TcgProtocol + '_>, Status>;

    /// Open the `EFI_TCG2_PROTOCOL` interface on `handle`.
    fn open_tcg2(&self, handle: Self::Handle) -> Result<Box<dyn Tcg2Protocol + '_>, Status>;

    /// Allocate a zeroed buffer of exactly `len` bytes for an event record.
    ///
    /// Returns `None` if the allocation cannot be satisfied.
    fn allocate_event(&self, len: usize) -> Option<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).ok()?;
        buf.resize(len, 0);
        Some(buf)
    }
}

/// `EFI_TCG_PROTOCOL` entry points used by this crate.
pub trait TcgProtocol {
    /// `StatusCheck`. `capability.size` is set by the caller.
    fn status_check(&mut self, capability: &mut v1::BootServiceCapability) -> Status;

    /// `PassThroughToTpm`: `input` is the raw command operand and `output`
    /// receives the raw response operand.
    fn pass_through_to_tpm(&mut self, input: &[u8], output: &mut [u8]) -> Status;

    /// `HashLogExtendEvent`: hash `data` with `algorithm`, fill the digest of
    /// `event` (a `TCG_PCR_EVENT`), extend the PCR and append `event` to the
    /// log.
    fn hash_log_extend_event(
        &mut self,
        data: &[u8],
        algorithm: u32,
        event: &mut [u8],
        event_number: &mut u32,
        event_log_last_entry: &mut u64,
    ) -> Status;
}

/// `EFI_TCG2_PROTOCOL` entry points used by this crate.
pub trait Tcg2Protocol {
    /// `GetCapability`. `capability.size` is set by the caller.
    fn get_capability(&mut self, capability: &mut v2::BootServiceCapability) -> Status;

    /// `SubmitCommand`: `input` is the raw command and `output` receives the
    /// raw response.
    fn submit_command(&mut self, input: &[u8], output: &mut [u8]) -> Status;

    /// `HashLogExtendEvent`: hash `data` with the active banks, extend the
    /// PCR named by `event` (an `EFI_TCG2_EVENT`) and log it.
    fn hash_log_extend_event(
        &mut self,
        flags: v2::HashLogExtendEventFlags,
        data: &[u8],
        event: &[u8],
    ) -> Status;
}
