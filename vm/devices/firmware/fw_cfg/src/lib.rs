// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reader for the QEMU firmware configuration (fw_cfg) device.
//!
//! Items are addressed by a 16-bit key written to the selector register;
//! their contents are then streamed out of the data register one byte at a
//! time. Named files are listed in a directory item, each entry giving the
//! file's size and key.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod port_io;

#[cfg(target_arch = "x86_64")]
pub use port_io::PortIo;

use alloc::vec::Vec;
use log::debug;
use static_assertions::const_assert_eq;
use thiserror::Error;
use zerocopy::FromBytes;
use zerocopy::FromZeros;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::byteorder::BigEndian;
use zerocopy::byteorder::U16;
use zerocopy::byteorder::U32;

/// Selector register I/O port.
pub const SELECTOR_PORT: u16 = 0x510;
/// Data register I/O port.
pub const DATA_PORT: u16 = 0x511;

/// Key of the signature item.
pub const SIGNATURE_KEY: u16 = 0x0000;
/// Key of the file directory item.
pub const FILE_DIR_KEY: u16 = 0x0019;
/// Contents of the signature item.
pub const SIGNATURE: [u8; 4] = *b"QEMU";

/// Maximum length of a file name, terminator included.
pub const FILE_NAME_LEN: usize = 56;

/// Register-level access to a fw_cfg device.
pub trait FwCfgAccess {
    /// Select the item `key` and rewind its data offset.
    fn select(&mut self, key: u16);

    /// Read the next byte of the selected item.
    fn read_u8(&mut self) -> u8;

    /// Fill `buf` from the selected item.
    fn read_into(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = self.read_u8();
        }
    }
}

/// `FWCfgFile`, one entry of the file directory.
#[repr(C)]
#[derive(Copy, Clone, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FwCfgFile {
    size: U32<BigEndian>,
    select: U16<BigEndian>,
    reserved: u16,
    name: [u8; FILE_NAME_LEN],
}

const_assert_eq!(size_of::<FwCfgFile>(), 64);

impl FwCfgFile {
    /// Size of the file contents in bytes.
    pub fn size(&self) -> u32 {
        self.size.get()
    }

    /// Key that selects the file contents.
    pub fn select(&self) -> u16 {
        self.select.get()
    }

    /// The file name, without its terminator.
    pub fn name(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILE_NAME_LEN);
        &self.name[..len]
    }
}

impl core::fmt::Debug for FwCfgFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FwCfgFile")
            .field("size", &self.size())
            .field("select", &format_args!("{:#x}", self.select()))
            .field("name", &self.name().escape_ascii())
            .finish()
    }
}

#[expect(missing_docs)] // self explanatory variants
#[derive(Debug, Error)]
pub enum FwCfgError {
    #[error("invalid fw_cfg signature {0:02x?}")]
    InvalidSignature([u8; 4]),
    #[error("fw_cfg file not found")]
    NotFound,
    #[error("cannot allocate {0} bytes for fw_cfg file")]
    OutOfMemory(usize),
}

/// A probed fw_cfg device.
pub struct FwCfg<A> {
    access: A,
}

impl<A: FwCfgAccess> FwCfg<A> {
    /// Check the device signature and wrap `access`.
    pub fn new(mut access: A) -> Result<Self, FwCfgError> {
        let mut signature = [0; 4];
        access.select(SIGNATURE_KEY);
        access.read_into(&mut signature);
        if signature != SIGNATURE {
            debug!("no fw_cfg device, signature {signature:02x?}");
            return Err(FwCfgError::InvalidSignature(signature));
        }
        Ok(Self { access })
    }

    /// Scan the file directory for `name`. The first matching entry wins.
    pub fn find(&mut self, name: &str) -> Option<FwCfgFile> {
        self.access.select(FILE_DIR_KEY);
        let mut count = U32::<BigEndian>::ZERO;
        self.access.read_into(count.as_mut_bytes());

        let mut entry = FwCfgFile::new_zeroed();
        for _ in 0..count.get() {
            self.access.read_into(entry.as_mut_bytes());
            if entry.name() == name.as_bytes() {
                debug!("found fw_cfg file {entry:?}");
                return Some(entry);
            }
        }
        None
    }

    /// Read the contents of the directory entry `file`.
    pub fn read_entry(&mut self, file: &FwCfgFile) -> Result<Vec<u8>, FwCfgError> {
        let len = file.size() as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| FwCfgError::OutOfMemory(len))?;
        data.resize(len, 0);

        self.access.select(file.select());
        self.access.read_into(&mut data);
        Ok(data)
    }

    /// Read the contents of the file `name`.
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>, FwCfgError> {
        let file = self.find(name).ok_or(FwCfgError::NotFound)?;
        self.read_entry(&file)
    }
}
