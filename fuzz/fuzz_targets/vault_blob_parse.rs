#![no_main]

use libfuzzer_sys::fuzz_target;
use seedvault_core::EncryptedVault;

fuzz_target!(|data: &[u8]| {
    // Binary form: accepted blobs must serialize back to the same bytes
    if let Ok(vault) = EncryptedVault::from_bytes(data) {
        assert_eq!(vault.to_bytes(), data);
        assert!(vault.params().validate().is_ok());
    }

    // Text form
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(vault) = EncryptedVault::parse(s) {
            let _ = EncryptedVault::parse(&vault.to_string());
        }
    }
});
