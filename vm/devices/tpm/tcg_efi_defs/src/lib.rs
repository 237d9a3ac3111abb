// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Definitions from the TCG EFI Protocol Specifications, covering both the
//! TPM 1.2 (`EFI_TCG_PROTOCOL`) and TPM 2.0 (`EFI_TCG2_PROTOCOL`) firmware
//! interfaces, plus the TCG PC Client pass-through parameter blocks.
//!
//! Only the structures needed to probe a TPM, forward raw commands, and
//! submit measurement events are defined here.

#![no_std]

pub mod pass_through;
pub mod v1;
pub mod v2;

/// `EV_IPL`: an event measured by the initial program loader. Used for every
/// measurement this stack submits.
pub const EV_IPL: u32 = 0x0000_000d;

/// Size in bytes of the terminator appended to event description text.
pub const EVENT_DATA_TERMINATOR_SIZE: usize = 1;
