// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Runtime support for the UEFI application environment.

// UNSAFETY: Raw assembly needed for panic handling to abort.
#![expect(unsafe_code)]

use uefi::println;
use uefi::runtime::ResetType;

#[panic_handler]
fn panic_handler(panic: &core::panic::PanicInfo<'_>) -> ! {
    println!("{}", panic);

    // A failed test must not fall through to the next boot option.
    if uefi::table::system_table_raw().is_some() {
        uefi::runtime::reset(ResetType::SHUTDOWN, uefi::Status::ABORTED, None);
    }

    println!("Could not shut down... falling back to invoking an undefined instruction");

    // SAFETY: the undefined instruction trap handler does not return
    unsafe {
        #[cfg(target_arch = "x86_64")]
        core::arch::asm!("ud2");
        #[cfg(target_arch = "aarch64")]
        core::arch::asm!("brk #0");
        core::hint::unreachable_unchecked();
    }
}
