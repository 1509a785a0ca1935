#![no_main]

use libfuzzer_sys::fuzz_target;

mod ops;

fuzz_target!(|data: &[u8]| {
    ops::run(data);
});
