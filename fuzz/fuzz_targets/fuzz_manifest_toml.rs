#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Manifest parsing and plan resolution should never panic
        if let Ok((manifest, _warnings)) =
            rdeploy::manifest::parse_with_warnings(content, Path::new("deploy.toml"))
        {
            let _ = manifest.connection_config(Path::new("deploy.toml"), |_| None);
            let _ = manifest.transfer_timeout();
        }
    }
});
