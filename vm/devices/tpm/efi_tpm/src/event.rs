// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builds measurement event records and submits them to the firmware log.
//!
//! TCG takes a `TCG_PCR_EVENT`: a fixed header with a SHA-1 digest slot that
//! the firmware fills in, followed by the event data. TCG2 takes an
//! `EFI_TCG2_EVENT`: a size, a versioned header, then the event data. In both
//! cases the event data is the description text plus a NUL terminator.

use crate::BadArgumentReason;
use crate::TpmError;
use crate::locate::OpenTpm;
use crate::platform::TpmPlatform;
use crate::status;
use alloc::vec::Vec;
use log::trace;
use log::warn;
use tcg_efi_defs::EV_IPL;
use tcg_efi_defs::EVENT_DATA_TERMINATOR_SIZE;
use tcg_efi_defs::v1;
use tcg_efi_defs::v2;
use zerocopy::IntoBytes;

/// One measurement to log.
#[derive(Debug, Copy, Clone)]
pub(crate) struct MeasurementEvent<'a> {
    pcr_index: u32,
    event_type: u32,
    description: &'a str,
}

impl<'a> MeasurementEvent<'a> {
    /// PCR range checks are left to the firmware.
    pub fn new(pcr_index: u8, description: &'a str) -> Self {
        Self {
            pcr_index: pcr_index.into(),
            event_type: EV_IPL,
            description,
        }
    }

    fn event_data_len(&self) -> usize {
        self.description.len() + EVENT_DATA_TERMINATOR_SIZE
    }

    fn event_data_size(&self) -> Result<u32, TpmError> {
        u32::try_from(self.event_data_len()).map_err(|_| self.too_large())
    }

    fn too_large(&self) -> TpmError {
        TpmError::BadArgument(BadArgumentReason::EventTooLarge(self.description.len()))
    }

    /// Writes the description and terminator into `data`, which is exactly
    /// [`Self::event_data_len`] bytes.
    fn write_event_data(&self, data: &mut [u8]) {
        let (text, terminator) = data.split_at_mut(self.description.len());
        text.copy_from_slice(self.description.as_bytes());
        terminator.fill(0);
    }

    pub fn v1_record_len(&self) -> usize {
        v1::PCR_EVENT_HEADER_SIZE + self.event_data_len()
    }

    /// Encode a `TCG_PCR_EVENT` into `record`, which is exactly
    /// [`Self::v1_record_len`] bytes. The digest is left zeroed for the
    /// firmware to compute.
    pub fn encode_v1(&self, record: &mut [u8]) -> Result<(), TpmError> {
        let header = v1::PcrEventHeader {
            pcr_index: self.pcr_index,
            event_type: self.event_type,
            digest: [0; 20],
            event_size: self.event_data_size()?,
        };
        let (head, data) = record.split_at_mut(v1::PCR_EVENT_HEADER_SIZE);
        head.copy_from_slice(header.as_bytes());
        self.write_event_data(data);
        Ok(())
    }

    pub fn v2_record_len(&self) -> usize {
        v2::EVENT_PREFIX_SIZE + self.event_data_len()
    }

    /// Encode an `EFI_TCG2_EVENT` into `record`, which is exactly
    /// [`Self::v2_record_len`] bytes.
    pub fn encode_v2(&self, record: &mut [u8]) -> Result<(), TpmError> {
        let size = u32::try_from(self.v2_record_len()).map_err(|_| self.too_large())?;
        let prefix = v2::EventPrefix {
            size,
            header: v2::EventHeader {
                header_size: v2::EVENT_HEADER_SIZE as u32,
                header_version: v2::EVENT_HEADER_VERSION,
                pcr_index: self.pcr_index,
                event_type: self.event_type,
            },
        };
        let (head, data) = record.split_at_mut(v2::EVENT_PREFIX_SIZE);
        head.copy_from_slice(prefix.as_bytes());
        self.write_event_data(data);
        Ok(())
    }
}

fn allocate_record<P: TpmPlatform>(platform: &P, len: usize) -> Result<Vec<u8>, TpmError> {
    match platform.allocate_event(len) {
        Some(record) if record.len() == len => Ok(record),
        _ => {
            warn!("no buffer for a {len} byte TPM event");
            Err(TpmError::OutOfMemory(len))
        }
    }
}

/// Hash `buffer` into the event's PCR and append the event to the log.
pub(crate) fn log_event<P: TpmPlatform>(
    platform: &P,
    tpm: &mut OpenTpm<'_>,
    buffer: &[u8],
    event: &MeasurementEvent<'_>,
) -> Result<(), TpmError> {
    let status = match tpm {
        OpenTpm::V1(tcg) => {
            let mut record = allocate_record(platform, event.v1_record_len())?;
            event.encode_v1(&mut record)?;
            let mut event_number = 0;
            let mut event_log_last_entry = 0;
            let status = tcg.hash_log_extend_event(
                buffer,
                v1::TCG_ALG_SHA,
                &mut record,
                &mut event_number,
                &mut event_log_last_entry,
            );
            trace!("TCG event number {event_number}, log tail {event_log_last_entry:#x}");
            status
        }
        OpenTpm::V2(tcg2) => {
            let mut record = allocate_record(platform, event.v2_record_len())?;
            event.encode_v2(&mut record)?;
            tcg2.hash_log_extend_event(v2::HashLogExtendEventFlags::new(), buffer, &record)
        }
    };
    status::translate(status).inspect_err(|err| {
        warn!(
            "{} extend of PCR {} failed: {err}",
            tpm.generation(),
            event.pcr_index
        )
    })
}
