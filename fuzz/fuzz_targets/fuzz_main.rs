// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use blockmark_core::{render_document, wire, BlockIndex, RenderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(blocks) = wire::blocks_from_json(json) else {
        return;
    };
    let Some(root) = blocks.first().map(|block| block.id.clone()) else {
        return;
    };
    let Ok(index) = BlockIndex::build(blocks) else {
        return;
    };
    for use_html_tags in [false, true] {
        let config = RenderConfig::default().with_html_tags(use_html_tags);
        let _ = render_document(&index, &root, &config);
    }
});
