// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parameter blocks of the TCG PC Client `PassThroughToTPM` interface.
//!
//! Callers hand over complete parameter blocks, but the firmware protocols
//! only accept the raw operand that follows the header. The length fields
//! count the header bytes too.

use static_assertions::const_assert_eq;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::byteorder::BigEndian;
use zerocopy::byteorder::U16;
use zerocopy::byteorder::U32;

/// Header of `PassThroughToTPM_InputParamBlock`. `TPMOperandIn` follows.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct InputParamBlockHeader {
    /// Length of the whole input block, header included.
    pub ipb_length: u16,
    /// Must be zero.
    pub reserved1: u16,
    /// Length of the whole output block, header included. Not consulted by
    /// the UEFI protocols.
    pub opb_length: u16,
    /// Must be zero.
    pub reserved2: u16,
}

/// Header of `PassThroughToTPM_OutputParamBlock`. `TPMOperandOut` follows.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct OutputParamBlockHeader {
    /// Length of the whole output block, header included.
    pub opb_length: u16,
    /// Must be zero.
    pub reserved: u16,
}

/// Size of [`InputParamBlockHeader`].
pub const INPUT_HEADER_SIZE: usize = size_of::<InputParamBlockHeader>();

/// Size of [`OutputParamBlockHeader`].
pub const OUTPUT_HEADER_SIZE: usize = size_of::<OutputParamBlockHeader>();

const_assert_eq!(INPUT_HEADER_SIZE, 8);
const_assert_eq!(OUTPUT_HEADER_SIZE, 4);

/// Common prefix of TPM 1.2 and TPM 2.0 response buffers: tag,
/// `responseSize`, and response code, all big-endian.
#[repr(C)]
#[derive(Debug, Copy, Clone, IntoBytes, FromBytes, Immutable, KnownLayout)]
#[expect(missing_docs)] // self explanatory fields
pub struct ResponseHeader {
    pub tag: U16<BigEndian>,
    pub response_size: U32<BigEndian>,
    pub response_code: U32<BigEndian>,
}

const_assert_eq!(size_of::<ResponseHeader>(), 10);
