// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod rt;
mod tests;

use uefi::Status;
use uefi::entry;
use uefi::println;
use uefi::system;

#[entry]
fn uefi_main() -> Status {
    if let Err(err) = uefi::helpers::init() {
        return err.status();
    }

    println!("UEFI vendor = {}", system::firmware_vendor());
    println!("UEFI revision = {:x}", system::firmware_revision());

    tests::run_tests();

    Status::SUCCESS
}
