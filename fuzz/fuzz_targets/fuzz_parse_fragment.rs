#![no_main]

use libfuzzer_sys::fuzz_target;
use sandbug_web::{apply, diff, parse_fragment, render};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 8192 {
        return;
    }

    // Split the input into an old and a new document.
    let (old_html, new_html) = text.split_once('\u{0}').unwrap_or((text, ""));
    let old = parse_fragment(old_html);
    let new = parse_fragment(new_html);

    // Rendering must never panic.
    let _ = render(&old);

    let patches = diff(&old, &new);
    let mut live = old.clone();
    apply(&mut live, &patches).expect("diff paths must resolve against the old tree");
    assert_eq!(live, new, "patched tree must equal the target");
});
