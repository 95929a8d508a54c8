#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must fail cleanly, and anything that decodes
    // must survive a word walk
    if let Ok(dawg) = lexdex::graph::codec::decode(data) {
        let mut count = 0usize;
        dawg.for_each_word(|_| count += 1);
    }
});
