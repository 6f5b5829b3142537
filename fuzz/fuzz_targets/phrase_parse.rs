#![no_main]

use libfuzzer_sys::fuzz_target;
use seedvault_core::RecoveryPhrase;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything accepted must already be canonical
        if let Ok(phrase) = RecoveryPhrase::parse(s) {
            let again = RecoveryPhrase::parse(phrase.as_str()).expect("canonical phrase reparses");
            assert_eq!(again.as_str(), phrase.as_str());
        }
    }
});
