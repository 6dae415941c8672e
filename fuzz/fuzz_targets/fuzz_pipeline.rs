#![no_main]

use libfuzzer_sys::fuzz_target;

use sheetcalc_core::CalculationContext;
use sheetcalc_orchestration::default_pipeline;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(document) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };

    // Arbitrary documents may fail every stage, but must never panic.
    let mut pipeline = default_pipeline().expect("default configuration is valid");
    let mut ctx = CalculationContext::for_raw(&document);
    let _ = pipeline.execute(&document, &mut ctx);
});
