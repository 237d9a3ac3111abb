// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use efi_tpm::ProtocolGeneration;
use efi_tpm::TpmOutcome;
use efi_tpm::TpmTransport;
use efi_tpm::uefi_tcg::UefiTpmPlatform;
use uefi::boot;
use uefi::println;

/// TPM2_GetRandom for 8 bytes.
const GET_RANDOM: [u8; 12] = [
    0x80, 0x01, 0x00, 0x00, 0x00, 0x0c, 0x00, 0x00, 0x01, 0x7b, 0x00, 0x08,
];

const MEASURE_PCR: u8 = 8;

pub fn run_tests() {
    println!("running tests...");

    macro_rules! do_test {
        ($test_fn:ident) => {{
            let name = stringify!($test_fn);
            println!(">>>>>> [TEST]: running '{}'", name);
            $test_fn(&TpmTransport::new(UefiTpmPlatform::new()));
            boot::stall(100000); // stall for 100ms
        }};
    }

    do_test!(test_generation);
    do_test!(test_capability);
    do_test!(test_get_random);
    do_test!(test_measure_string);
    #[cfg(target_arch = "x86_64")]
    do_test!(test_measure_fw_cfg);

    println!("all tests passed");
}

fn test_generation(tpm: &TpmTransport<UefiTpmPlatform>) {
    println!("TPM protocol: {}", tpm.generation());
}

fn test_capability(tpm: &TpmTransport<UefiTpmPlatform>) {
    match tpm.capability() {
        TpmOutcome::Completed(report) => {
            assert!(report.usable());
            println!("TPM is usable");
        }
        TpmOutcome::NoTpm(reason) => println!("no usable TPM: {reason}"),
    }
}

fn test_get_random(tpm: &TpmTransport<UefiTpmPlatform>) {
    match tpm.forward_command(&GET_RANDOM, 64).unwrap() {
        TpmOutcome::Completed(response) => {
            println!("TPM2_GetRandom response: {:02x?}", response);
            assert!(response.len() >= 10, "response shorter than its header");
            // A TPM 1.2 rejects the TPM 2.0 tag, so only check
            // the payload for TCG2.
            if tpm.generation() == ProtocolGeneration::V2 {
                assert_eq!(response[6..10], [0; 4], "TPM_RC_SUCCESS expected");
            }
        }
        TpmOutcome::NoTpm(reason) => println!("skipped: {reason}"),
    }
}

fn test_measure_string(tpm: &TpmTransport<UefiTpmPlatform>) {
    let outcome = tpm
        .log_measurement(b"guest_test_uefi", MEASURE_PCR, "guest_test_uefi string")
        .unwrap();
    match outcome {
        TpmOutcome::Completed(()) => println!("measured into PCR {MEASURE_PCR}"),
        TpmOutcome::NoTpm(reason) => println!("skipped: {reason}"),
    }
}

#[cfg(target_arch = "x86_64")]
// UNSAFETY: Probing the fw_cfg I/O ports.
#[expect(unsafe_code)]
fn test_measure_fw_cfg(tpm: &TpmTransport<UefiTpmPlatform>) {
    use fw_cfg::FwCfg;
    use fw_cfg::FwCfgError;
    use fw_cfg::PortIo;

    const MEASURE_FILE: &str = "opt/guest_test_uefi/measure";

    // SAFETY: fw_cfg ports are unclaimed when the device is absent, and the
    // signature check rejects anything else before further access.
    let access = unsafe { PortIo::new() };
    let mut fw_cfg = match FwCfg::new(access) {
        Ok(fw_cfg) => fw_cfg,
        Err(err) => {
            println!("skipped: {err}");
            return;
        }
    };

    let data = match fw_cfg.read_file(MEASURE_FILE) {
        Ok(data) => data,
        Err(FwCfgError::NotFound) => {
            println!("skipped: no fw_cfg file {MEASURE_FILE}");
            return;
        }
        Err(err) => panic!("reading {MEASURE_FILE} failed: {err}"),
    };
    log::info!("measuring {} bytes of {MEASURE_FILE}", data.len());

    match tpm.log_measurement(&data, MEASURE_PCR, MEASURE_FILE).unwrap() {
        TpmOutcome::Completed(()) => {
            println!("measured {MEASURE_FILE} into PCR {MEASURE_PCR}")
        }
        TpmOutcome::NoTpm(reason) => println!("skipped: {reason}"),
    }
}
