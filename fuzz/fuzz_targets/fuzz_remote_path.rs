#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(path) = rdeploy::RemotePath::new(raw) {
            // Normalized form must re-parse to itself
            let again = rdeploy::RemotePath::new(path.as_str()).ok();
            assert_eq!(again.as_ref(), Some(&path));
            let _ = path.parent();
            let _ = path.join("child");
        }
    }
});
