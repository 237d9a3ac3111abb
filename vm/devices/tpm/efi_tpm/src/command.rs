// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Forwards pass-through parameter blocks to the TPM.
//!
//! The firmware protocols take the raw operand with no parameter block
//! header, so the header is stripped and the declared lengths are reduced by
//! the header size before the call.

use crate::BadArgumentReason;
use crate::TpmError;
use crate::locate::OpenTpm;
use crate::status;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;
use log::warn;
use tcg_efi_defs::pass_through::INPUT_HEADER_SIZE;
use tcg_efi_defs::pass_through::InputParamBlockHeader;
use tcg_efi_defs::pass_through::OUTPUT_HEADER_SIZE;
use tcg_efi_defs::pass_through::OutputParamBlockHeader;
use tcg_efi_defs::pass_through::ResponseHeader;
use zerocopy::FromBytes;
use zerocopy::IntoBytes;

/// A caller-owned pair of pass-through parameter blocks.
///
/// `input` is a `PassThroughToTPM_InputParamBlock` whose `IPBLength` covers
/// the header and the command operand. `output` is a
/// `PassThroughToTPM_OutputParamBlock` whose `OPBLength` covers the header
/// and the space available for the response operand.
pub struct CommandBlock<'a> {
    input: &'a [u8],
    output: &'a mut [u8],
}

impl<'a> CommandBlock<'a> {
    /// Wrap caller-provided parameter blocks.
    pub fn new(input: &'a [u8], output: &'a mut [u8]) -> Self {
        Self { input, output }
    }

    /// Split the blocks into the command operand and the response operand
    /// buffer, as described by their headers.
    fn into_operands(self) -> Result<(&'a [u8], &'a mut [u8]), BadArgumentReason> {
        let Ok((input_header, _)) = InputParamBlockHeader::read_from_prefix(self.input) else {
            return Err(truncated(self.input.len(), INPUT_HEADER_SIZE));
        };
        let Ok((output_header, _)) = OutputParamBlockHeader::read_from_prefix(self.output) else {
            return Err(truncated(self.output.len(), OUTPUT_HEADER_SIZE));
        };

        let input = operand_range(input_header.ipb_length, INPUT_HEADER_SIZE, self.input)?;
        let output = operand_range(output_header.opb_length, OUTPUT_HEADER_SIZE, self.output)?;

        Ok((&self.input[input], &mut self.output[output]))
    }
}

fn truncated(len: usize, header: usize) -> BadArgumentReason {
    BadArgumentReason::TruncatedParamBlock { len, header }
}

/// The operand region of `block` when its header claims `declared` bytes.
fn operand_range(
    declared: u16,
    header: usize,
    block: &[u8],
) -> Result<Range<usize>, BadArgumentReason> {
    let end = usize::from(declared);
    if end < header {
        return Err(BadArgumentReason::LengthBelowHeader { declared, header });
    }
    if end > block.len() {
        return Err(BadArgumentReason::LengthExceedsBuffer {
            declared,
            len: block.len(),
        });
    }
    Ok(header..end)
}

/// Send the command in `block` and wait for the response.
pub(crate) fn forward(tpm: &mut OpenTpm<'_>, block: CommandBlock<'_>) -> Result<(), TpmError> {
    let (input, output) = block.into_operands().map_err(TpmError::BadArgument)?;
    let status = match tpm {
        OpenTpm::V1(tcg) => tcg.pass_through_to_tpm(input, output),
        OpenTpm::V2(tcg2) => tcg2.submit_command(input, output),
    };
    status::translate(status).inspect_err(|err| {
        warn!(
            "{} command of {} bytes failed: {err}",
            tpm.generation(),
            input.len()
        )
    })
}

fn block_length(header: usize, operand_len: usize) -> Result<u16, TpmError> {
    let too_large = TpmError::BadArgument(BadArgumentReason::ParamBlockTooLarge(operand_len));
    header
        .checked_add(operand_len)
        .and_then(|len| u16::try_from(len).ok())
        .ok_or(too_large)
}

/// Build the input and output parameter blocks for a raw command.
pub(crate) fn frame(
    operand: &[u8],
    output_capacity: usize,
) -> Result<(Vec<u8>, Vec<u8>), TpmError> {
    let ipb_length = block_length(INPUT_HEADER_SIZE, operand.len())?;
    let opb_length = block_length(OUTPUT_HEADER_SIZE, output_capacity)?;

    let mut input = Vec::with_capacity(ipb_length.into());
    input.extend_from_slice(
        InputParamBlockHeader {
            ipb_length,
            reserved1: 0,
            opb_length,
            reserved2: 0,
        }
        .as_bytes(),
    );
    input.extend_from_slice(operand);

    let mut output = vec![0; opb_length.into()];
    output[..OUTPUT_HEADER_SIZE].copy_from_slice(
        OutputParamBlockHeader {
            opb_length,
            reserved: 0,
        }
        .as_bytes(),
    );

    Ok((input, output))
}

/// Extract the response operand from an output block produced by [`frame`].
///
/// The response is trimmed to its `responseSize` when the TPM response
/// header is well formed.
pub(crate) fn response(mut output: Vec<u8>) -> Vec<u8> {
    output.drain(..OUTPUT_HEADER_SIZE);
    if let Ok((header, _)) = ResponseHeader::read_from_prefix(&output) {
        let size = header.response_size.get() as usize;
        if (size_of::<ResponseHeader>()..=output.len()).contains(&size) {
            output.truncate(size);
        }
    }
    output
}
