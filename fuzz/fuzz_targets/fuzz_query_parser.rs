#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and planning arbitrary queries must never panic
    if let Ok(spec) = lexdex::query::parse_search(data) {
        let _ = lexdex::query::QueryPlan::from_spec(&spec, true);
        let _ = lexdex::query::QueryPlan::from_spec(&spec, false);
    }
});
