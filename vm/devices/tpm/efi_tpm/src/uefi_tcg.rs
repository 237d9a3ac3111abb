// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`TpmPlatform`] backed by the running UEFI firmware.
//!
//! Protocol interfaces are opened with `GET_PROTOCOL` semantics and only
//! used while the operation that opened them is running. Boot services must
//! still be active.

// UNSAFETY: Calling into firmware protocol function tables.
#![expect(unsafe_code)]

use crate::platform::Tcg2Protocol;
use crate::platform::TcgProtocol;
use crate::platform::TpmPlatform;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ptr;
use tcg_efi_defs::v1;
use tcg_efi_defs::v2;
use uefi::Guid;
use uefi::Handle;
use uefi::Status;
use uefi::boot;
use uefi::boot::OpenProtocolAttributes;
use uefi::boot::OpenProtocolParams;
use uefi::boot::ScopedProtocol;
use uefi::boot::SearchType;
use uefi::data_types::PhysicalAddress;
use uefi::proto::Protocol;
use uefi::proto::unsafe_protocol;

/// `EFI_TCG_PROTOCOL` function table.
#[repr(C)]
#[unsafe_protocol("f541796d-a62e-4954-a775-9584f61b9cdd")]
pub struct RawTcg {
    status_check: unsafe extern "efiapi" fn(
        this: *mut RawTcg,
        protocol_capability: *mut v1::BootServiceCapability,
        tcg_feature_flags: *mut u32,
        event_log_location: *mut PhysicalAddress,
        event_log_last_entry: *mut PhysicalAddress,
    ) -> Status,
    _hash_all: unsafe extern "efiapi" fn() -> Status,
    _log_event: unsafe extern "efiapi" fn() -> Status,
    pass_through_to_tpm: unsafe extern "efiapi" fn(
        this: *mut RawTcg,
        tpm_input_parameter_block_size: u32,
        tpm_input_parameter_block: *const u8,
        tpm_output_parameter_block_size: u32,
        tpm_output_parameter_block: *mut u8,
    ) -> Status,
    hash_log_extend_event: unsafe extern "efiapi" fn(
        this: *mut RawTcg,
        hash_data: PhysicalAddress,
        hash_data_len: u64,
        algorithm_id: u32,
        tcg_log_data: *mut u8,
        event_number: *mut u32,
        event_log_last_entry: *mut PhysicalAddress,
    ) -> Status,
}

/// `EFI_TCG2_PROTOCOL` function table.
#[repr(C)]
#[unsafe_protocol("607f766c-7455-42be-930b-e4d76db2720f")]
pub struct RawTcg2 {
    get_capability: unsafe extern "efiapi" fn(
        this: *mut RawTcg2,
        protocol_capability: *mut v2::BootServiceCapability,
    ) -> Status,
    _get_event_log: unsafe extern "efiapi" fn() -> Status,
    hash_log_extend_event: unsafe extern "efiapi" fn(
        this: *mut RawTcg2,
        flags: u64,
        data_to_hash: PhysicalAddress,
        data_to_hash_len: u64,
        efi_tcg_event: *const u8,
    ) -> Status,
    submit_command: unsafe extern "efiapi" fn(
        this: *mut RawTcg2,
        input_parameter_block_size: u32,
        input_parameter_block: *const u8,
        output_parameter_block_size: u32,
        output_parameter_block: *mut u8,
    ) -> Status,
    _get_active_pcr_banks: unsafe extern "efiapi" fn() -> Status,
    _set_active_pcr_banks: unsafe extern "efiapi" fn() -> Status,
    _get_result_of_set_active_pcr_banks: unsafe extern "efiapi" fn() -> Status,
}

/// The firmware's boot services handle database.
#[derive(Debug, Default, Copy, Clone)]
pub struct UefiTpmPlatform;

impl UefiTpmPlatform {
    /// Create the platform. Boot services must not have been exited.
    pub fn new() -> Self {
        Self
    }
}

fn open<P: Protocol>(handle: Handle) -> Result<ScopedProtocol<P>, Status> {
    let params = OpenProtocolParams {
        handle,
        agent: boot::image_handle(),
        controller: None,
    };
    let attributes = OpenProtocolAttributes::GetProtocol;
    // SAFETY: GET_PROTOCOL does not take ownership of the interface. The
    // returned scope is dropped before the operation returns, and the TCG
    // protocols are never uninstalled while boot services are running.
    let protocol = unsafe { boot::open_protocol::<P>(params, attributes) };
    let protocol = protocol.map_err(|err| err.status())?;
    // GET_PROTOCOL may succeed with a null interface.
    if protocol.get().is_none() {
        return Err(Status::UNSUPPORTED);
    }
    Ok(protocol)
}

impl TpmPlatform for UefiTpmPlatform {
    type Handle = Handle;

    fn locate_handles(&self, protocol: &Guid) -> Result<Vec<Handle>, Status> {
        let handles = boot::locate_handle_buffer(SearchType::ByProtocol(protocol))
            .map_err(|err| err.status())?;
        Ok(handles.to_vec())
    }

    fn open_tcg(&self, handle: Handle) -> Result<Box<dyn TcgProtocol + '_>, Status> {
        Ok(Box::new(UefiTcg(open::<RawTcg>(handle)?)))
    }

    fn open_tcg2(&self, handle: Handle) -> Result<Box<dyn Tcg2Protocol + '_>, Status> {
        Ok(Box::new(UefiTcg2(open::<RawTcg2>(handle)?)))
    }
}

fn buffer_size(buf: &[u8]) -> Option<u32> {
    u32::try_from(buf.len()).ok()
}

struct UefiTcg(ScopedProtocol<RawTcg>);

impl TcgProtocol for UefiTcg {
    fn status_check(&mut self, capability: &mut v1::BootServiceCapability) -> Status {
        let this: &mut RawTcg = &mut self.0;
        let status_check = this.status_check;
        let mut feature_flags = 0;
        let mut event_log_location = 0;
        let mut event_log_last_entry = 0;
        // SAFETY: `this` is an open protocol interface and every out pointer
        // refers to a live local or to `capability`.
        unsafe {
            status_check(
                ptr::from_mut(this),
                capability,
                &mut feature_flags,
                &mut event_log_location,
                &mut event_log_last_entry,
            )
        }
    }

    fn pass_through_to_tpm(&mut self, input: &[u8], output: &mut [u8]) -> Status {
        let sizes = (buffer_size(input), buffer_size(output));
        let (Some(input_size), Some(output_size)) = sizes else {
            return Status::INVALID_PARAMETER;
        };
        let this: &mut RawTcg = &mut self.0;
        let pass_through_to_tpm = this.pass_through_to_tpm;
        // SAFETY: the firmware reads `input_size` bytes from `input` and
        // writes at most `output_size` bytes to `output`.
        unsafe {
            pass_through_to_tpm(
                ptr::from_mut(this),
                input_size,
                input.as_ptr(),
                output_size,
                output.as_mut_ptr(),
            )
        }
    }

    fn hash_log_extend_event(
        &mut self,
        data: &[u8],
        algorithm: u32,
        event: &mut [u8],
        event_number: &mut u32,
        event_log_last_entry: &mut u64,
    ) -> Status {
        let this: &mut RawTcg = &mut self.0;
        let hash_log_extend_event = this.hash_log_extend_event;
        // SAFETY: `data` is identity mapped during boot services, `event` is a
        // complete TCG_PCR_EVENT whose digest the firmware overwrites in
        // place, and the out pointers refer to live values.
        unsafe {
            hash_log_extend_event(
                ptr::from_mut(this),
                data.as_ptr() as PhysicalAddress,
                data.len() as u64,
                algorithm,
                event.as_mut_ptr(),
                event_number,
                event_log_last_entry,
            )
        }
    }
}

struct UefiTcg2(ScopedProtocol<RawTcg2>);

impl Tcg2Protocol for UefiTcg2 {
    fn get_capability(&mut self, capability: &mut v2::BootServiceCapability) -> Status {
        let this: &mut RawTcg2 = &mut self.0;
        let get_capability = this.get_capability;
        // SAFETY: `this` is an open protocol interface and `capability` is
        // sized as declared in its `size` field.
        unsafe { get_capability(ptr::from_mut(this), capability) }
    }

    fn submit_command(&mut self, input: &[u8], output: &mut [u8]) -> Status {
        let sizes = (buffer_size(input), buffer_size(output));
        let (Some(input_size), Some(output_size)) = sizes else {
            return Status::INVALID_PARAMETER;
        };
        let this: &mut RawTcg2 = &mut self.0;
        let submit_command = this.submit_command;
        // SAFETY: the firmware reads `input_size` bytes from `input` and
        // writes at most `output_size` bytes to `output`.
        unsafe {
            submit_command(
                ptr::from_mut(this),
                input_size,
                input.as_ptr(),
                output_size,
                output.as_mut_ptr(),
            )
        }
    }

    fn hash_log_extend_event(
        &mut self,
        flags: v2::HashLogExtendEventFlags,
        data: &[u8],
        event: &[u8],
    ) -> Status {
        let this: &mut RawTcg2 = &mut self.0;
        let hash_log_extend_event = this.hash_log_extend_event;
        // SAFETY: `data` is identity mapped during boot services and `event`
        // is a complete EFI_TCG2_EVENT that the firmware only reads.
        unsafe {
            hash_log_extend_event(
                ptr::from_mut(this),
                flags.into(),
                data.as_ptr() as PhysicalAddress,
                data.len() as u64,
                event.as_ptr(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RawTcg;
    use super::RawTcg2;
    use tcg_efi_defs::v1;
    use tcg_efi_defs::v2;
    use uefi::Identify;

    #[test]
    fn protocol_guids_match_definitions() {
        assert_eq!(RawTcg::GUID, v1::PROTOCOL_GUID);
        assert_eq!(RawTcg2::GUID, v2::PROTOCOL_GUID);
    }

    #[test]
    fn function_tables_have_expected_entry_counts() {
        assert_eq!(size_of::<RawTcg>(), 5 * size_of::<usize>());
        assert_eq!(size_of::<RawTcg2>(), 7 * size_of::<usize>());
    }
}
