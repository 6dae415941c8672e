#![no_main]

use libfuzzer_sys::fuzz_target;

use sheetcalc_core::raw;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some((path, body)) = text.split_once('\n') else {
        return;
    };
    let Ok(document) = serde_json::from_str::<serde_json::Value>(body) else {
        return;
    };

    // Lookups over arbitrary documents and paths must never panic.
    let _ = raw::lookup(&document, path);
    let _ = raw::first_str(&document, &[path, "character.name"]);
    let _ = raw::first_i64(&document, &[path]);
    let _ = raw::first_array(&document, &[path]);
});
