// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::BadArgumentReason;
use crate::ProtocolGeneration;
use crate::TpmError;
use crate::TpmOutcome;
use crate::tests::mocks::GENERATIONS;
use crate::tests::mocks::MockPlatform;
use crate::tests::mocks::MockTpm;
use crate::tests::mocks::transport_for;
use tcg_efi_defs::EV_IPL;
use tcg_efi_defs::v1;
use tcg_efi_defs::v2;
use uefi::Status;
use zerocopy::FromBytes;

fn parse_v1(event: &[u8]) -> (v1::PcrEventHeader, &[u8]) {
    v1::PcrEventHeader::read_from_prefix(event).unwrap()
}

fn parse_v2(event: &[u8]) -> (v2::EventPrefix, &[u8]) {
    v2::EventPrefix::read_from_prefix(event).unwrap()
}

#[test]
fn v1_event_record_layout() {
    let transport = MockPlatform::v1(MockTpm::healthy()).into_transport();

    let outcome = transport.log_measurement(b"measured", 7, "test-event");
    assert_eq!(outcome, Ok(TpmOutcome::Completed(())));

    let log = transport.platform().log();
    assert_eq!(log.allocations, [32 + 11]);
    let submitted = &log.v1_events[0];
    assert_eq!(submitted.data, b"measured");
    assert_eq!(submitted.algorithm, v1::TCG_ALG_SHA);

    let (header, data) = parse_v1(&submitted.event);
    assert_eq!({ header.pcr_index }, 7);
    assert_eq!({ header.event_type }, EV_IPL);
    assert_eq!({ header.digest }, [0; 20]);
    assert_eq!({ header.event_size }, 11);
    assert_eq!(data, b"test-event\0");
}

#[test]
fn v2_event_record_layout() {
    let transport = MockPlatform::v2(MockTpm::healthy()).into_transport();

    let outcome = transport.log_measurement(b"measured", 7, "test-event");
    assert_eq!(outcome, Ok(TpmOutcome::Completed(())));

    let log = transport.platform().log();
    assert_eq!(log.allocations, [18 + 11]);
    let submitted = &log.v2_events[0];
    assert_eq!(submitted.flags, v2::HashLogExtendEventFlags::new());
    assert_eq!(submitted.data, b"measured");

    let (prefix, data) = parse_v2(&submitted.event);
    let header = prefix.header;
    assert_eq!({ prefix.size }, 29);
    assert_eq!({ header.header_size }, 14);
    assert_eq!({ header.header_version }, 1);
    assert_eq!({ header.pcr_index }, 7);
    assert_eq!({ header.event_type }, EV_IPL);
    assert_eq!(data, b"test-event\0");
}

#[test]
fn empty_description_is_just_terminator() {
    let transport = MockPlatform::v2(MockTpm::healthy()).into_transport();

    let outcome = transport.log_measurement(&[], 0, "");
    assert!(outcome.unwrap().is_completed());

    let log = transport.platform().log();
    let event = &log.v2_events[0].event;
    assert_eq!(event.len(), 19);
    assert_eq!(event[18], 0);
    assert!(log.v2_events[0].data.is_empty());
}

#[test]
fn boot_measurement_end_to_end() {
    let transport = MockPlatform::v2(MockTpm::healthy()).into_transport();
    let buffer = [0xaa; 32];

    let outcome = transport.log_measurement(&buffer, 0, "boot-measurement");
    assert_eq!(outcome, Ok(TpmOutcome::Completed(())));
    // PCR indices are handed to the firmware unchecked.
    let outcome = transport.log_measurement(&buffer, 255, "boot-measurement");
    assert_eq!(outcome, Ok(TpmOutcome::Completed(())));

    let log = transport.platform().log();
    assert_eq!(log.v2_events.len(), 2);
    for (submitted, pcr_index) in log.v2_events.iter().zip([0u32, 255]) {
        assert_eq!(submitted.data, buffer);
        let (prefix, data) = parse_v2(&submitted.event);
        let header = prefix.header;
        assert_eq!({ header.header_version }, 1);
        assert_eq!({ header.event_type }, 0x0d);
        assert_eq!({ header.pcr_index }, pcr_index);
        assert_eq!(data, b"boot-measurement\0");
    }
}

#[test]
fn v1_pcr_index_is_not_range_checked() {
    let transport = MockPlatform::v1(MockTpm::healthy()).into_transport();

    let outcome = transport.log_measurement(b"x", 255, "high");
    assert!(outcome.unwrap().is_completed());

    let log = transport.platform().log();
    let (header, _) = parse_v1(&log.v1_events[0].event);
    assert_eq!({ header.pcr_index }, 255);
}

#[test]
fn allocation_failure_skips_extend() {
    for generation in GENERATIONS {
        let platform = MockPlatform {
            fail_allocation: true,
            ..MockPlatform::for_generation(generation, MockTpm::healthy())
        };
        let transport = platform.into_transport();
        let header = match generation {
            ProtocolGeneration::V1 => 32,
            _ => 18,
        };

        let outcome = transport.log_measurement(b"data", 8, "kernel");
        assert_eq!(outcome, Err(TpmError::OutOfMemory(header + 7)));

        let log = transport.platform().log();
        assert_eq!(log.capability_queries, 1);
        assert_eq!(log.hardware_calls(), 0);
    }
}

#[test]
fn extend_failure_is_translated() {
    for generation in GENERATIONS {
        let tpm = MockTpm {
            hardware_status: Status::INVALID_PARAMETER,
            ..MockTpm::healthy()
        };
        let transport = transport_for(generation, tpm);

        let outcome = transport.log_measurement(b"data", 30, "kernel");
        let invalid = BadArgumentReason::InvalidParameter;
        assert_eq!(outcome, Err(TpmError::BadArgument(invalid)));
        assert_eq!(transport.platform().log().hardware_calls(), 1);
    }
}
