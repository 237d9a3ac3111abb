// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Legacy x86 I/O port access to the fw_cfg device.

#![cfg(target_arch = "x86_64")]
// UNSAFETY: Issuing port I/O instructions.
#![expect(unsafe_code)]

use crate::DATA_PORT;
use crate::FwCfgAccess;
use crate::SELECTOR_PORT;
use x86_64::instructions::port::Port;
use x86_64::instructions::port::PortReadOnly;

/// fw_cfg access through the selector and data I/O ports.
pub struct PortIo {
    selector: Port<u16>,
    data: PortReadOnly<u8>,
}

impl PortIo {
    /// Create an accessor for the fw_cfg I/O ports.
    ///
    /// # Safety
    ///
    /// The caller must be sure that ports 0x510 and 0x511 are either the
    /// fw_cfg device or unclaimed, so that writing a key to the selector and
    /// reading from the data port have no other side effects.
    pub unsafe fn new() -> Self {
        Self {
            selector: Port::new(SELECTOR_PORT),
            data: PortReadOnly::new(DATA_PORT),
        }
    }
}

impl FwCfgAccess for PortIo {
    fn select(&mut self, key: u16) {
        // SAFETY: the constructor's caller vouched for the selector port.
        unsafe { self.selector.write(key) }
    }

    fn read_u8(&mut self) -> u8 {
        // SAFETY: the constructor's caller vouched for the data port.
        unsafe { self.data.read() }
    }
}
