#![no_main]

use libfuzzer_sys::fuzz_target;
use wf_core::Direction;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(workflow) = wf_parser::parse(markup) else {
        return;
    };

    for direction in Direction::ALL {
        let mermaid = wf_render_mermaid::render_mermaid(&workflow, Some(direction.as_str()));
        let header = format!("graph {direction}\n");
        assert!(mermaid.starts_with(&header));
    }
});
