#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use sandbug_compile::CompilerRegistry;
use sandbug_web::{ChannelConfig, FrameConfig, FrameRuntime, PreviewChannel};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16384 {
        return;
    }

    // Arbitrary payloads on either side of the channel must be rejected
    // with an error, never a panic.
    let mut frame = FrameRuntime::new(FrameConfig::default(), CompilerRegistry::with_builtins());
    let first = frame.handle_message(text, "null", Duration::ZERO);
    if let Ok(Some(response)) = &first {
        // A repeat of an accepted update is always a duplicate.
        let again = frame
            .handle_message(text, "null", Duration::from_millis(1))
            .expect("accepted once, accepted again");
        assert!(again.is_some_and(|response| response.is_duplicate()));
        assert!(response.ack.payload.contains("\"ack\""));
    }

    let mut channel = PreviewChannel::new(ChannelConfig::default());
    let _ = channel.handle_message(text, "null", Duration::ZERO);
    assert_eq!(channel.pending_len(), 0);
});
