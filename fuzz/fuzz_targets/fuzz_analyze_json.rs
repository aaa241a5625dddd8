#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_vulntree::{analyze_str, AnalysisConfig};

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the whole analysis pipeline from JSON text.
///
/// Input is also wrapped as a component list so that fuzzed records reach the
/// graph builder instead of failing the top-level object check.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let config = AnalysisConfig::default();
        let _ = analyze_str(s, &config);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(r#"{{"bomFormat":"CycloneDX","components":[{s}]}}"#);
            let _ = analyze_str(&wrapped, &config);
        }
    }
});
