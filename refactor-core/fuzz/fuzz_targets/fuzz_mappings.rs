#![no_main]

use libfuzzer_sys::fuzz_target;
use refactor_core::{parse_mappings, plan_batch};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let Ok(mappings) = parse_mappings(&input) else {
        return;
    };

    if let Ok(plan) = plan_batch(&mappings) {
        // Cycle members take two steps, every other mapping one
        assert!(plan.steps.len() >= mappings.len());
        assert_eq!(plan.steps.len(), mappings.len() + plan.circular_renames());
    }
});
