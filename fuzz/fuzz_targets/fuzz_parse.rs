#![no_main]

use libfuzzer_sys::fuzz_target;
use wf_core::WorkflowError;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };

    match wf_parser::parse(markup) {
        Ok(workflow) => {
            for connection in workflow.connections() {
                assert!(workflow.node(&connection.from_node_id).is_some());
                assert!(workflow.node(&connection.to_node_id).is_some());
            }
            let stripped = wf_parser::strip_comments(markup);
            assert_eq!(workflow.markup_stripped(), stripped);
        }
        Err(WorkflowError::MalformedFlow { line, .. }) => {
            assert!(line >= 1 && line <= wf_parser::escape(markup).lines().count());
        }
        Err(other) => panic!("unexpected parse error: {other}"),
    }
});
