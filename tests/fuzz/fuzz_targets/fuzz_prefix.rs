#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let dirs: Vec<&str> = text.lines().collect();

    // Any chosen prefix must end with '/' and be shared by some directory.
    if let Some(prefix) = covtree::prefix::resolve_prefix(&dirs) {
        assert!(prefix.ends_with('/'));
        assert!(dirs.iter().any(|d| d.starts_with(prefix.as_str())));
    }
});
