#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let engine = whisker::Engine::new();
    if let Ok(template) = engine.compile(data) {
        assert_eq!(template.source(), data);
    }
});
