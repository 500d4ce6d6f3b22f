//! Parent channel and preview frame wired back to back, with the host's
//! `postMessage` replaced by direct calls.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sandbug_compile::CompilerRegistry;
use sandbug_web::{
    ChannelConfig, ChannelEvent, ConsoleArg, ConsoleLog, ConsoleMethod, FrameConfig,
    FrameRuntime, OutboundPost, PanelInput, PanelMap, PreviewChannel, RenderAction, UpdateFlags,
    UpdateMessage,
};

const PARENT: &str = "https://sandbug.test";
const FRAME: &str = "https://preview.sandbug.test";

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn wall() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn map(markup: &str) -> PanelMap {
    PanelMap {
        markup: PanelInput::new("gfm", markup),
        style: PanelInput::new("css", "h1 { color: red; }"),
        script: PanelInput::new("javascript", "console.log('ready');"),
    }
}

fn pair() -> (PreviewChannel, FrameRuntime) {
    let channel = PreviewChannel::new(ChannelConfig {
        frame_origin: FRAME.to_owned(),
        ..ChannelConfig::default()
    });
    let frame = FrameRuntime::new(
        FrameConfig {
            parent_origin: PARENT.to_owned(),
            ..FrameConfig::default()
        },
        CompilerRegistry::with_builtins(),
    );
    (channel, frame)
}

#[test]
fn out_of_order_deliveries_are_acked_independently() {
    let (mut channel, mut frame) = pair();
    let first = channel
        .update(map("# One"), UpdateFlags::FULL, wall(), ms(0))
        .unwrap();
    let second = channel
        .update(map("# Two"), UpdateFlags::FULL, wall(), ms(10))
        .unwrap();
    assert_eq!(second.target_origin, FRAME);
    let t1 = UpdateMessage::from_json(&first.payload).unwrap().timestamp;
    let t2 = UpdateMessage::from_json(&second.payload).unwrap().timestamp;
    assert!(t1 < t2);

    // The second update overtakes the first.
    let response = frame
        .handle_message(&second.payload, PARENT, ms(12))
        .unwrap()
        .unwrap();
    let [RenderAction::Rewrite { html }] = response.actions.as_slice() else {
        panic!("expected a rewrite, got {:?}", response.actions);
    };
    assert!(html.contains("<h1>Two</h1>"));
    let acked = channel
        .handle_message(&response.ack.payload, FRAME, ms(15))
        .unwrap();
    assert!(matches!(acked, Some(ChannelEvent::Acked { timestamp, .. }) if timestamp == t2));
    assert!(channel.is_pending(t1));

    // Only the first is still retried.
    let retries = channel.poll(ms(100));
    assert_eq!(retries.len(), 1);
    assert_eq!(retries[0].payload, first.payload);
    let response = frame
        .handle_message(&retries[0].payload, PARENT, ms(101))
        .unwrap()
        .unwrap();
    assert!(!response.is_duplicate());
    let acked = channel
        .handle_message(&response.ack.payload, FRAME, ms(102))
        .unwrap();
    assert!(matches!(
        acked,
        Some(ChannelEvent::Acked { timestamp, attempts: 2, .. }) if timestamp == t1
    ));
    assert_eq!(channel.pending_len(), 0);

    // A late copy of the original post is re-acked but not rendered again.
    let response = frame
        .handle_message(&first.payload, PARENT, ms(150))
        .unwrap()
        .unwrap();
    assert!(response.is_duplicate());
    assert_eq!(
        channel
            .handle_message(&response.ack.payload, FRAME, ms(151))
            .unwrap(),
        None
    );
}

#[test]
fn patch_updates_reach_the_live_body() {
    let (mut channel, mut frame) = pair();
    let full = channel
        .update(map("# Title\n\nbody"), UpdateFlags::FULL, wall(), ms(0))
        .unwrap();
    frame.handle_message(&full.payload, PARENT, ms(1)).unwrap();

    let patch = channel
        .update(
            map("# Title\n\nnew body"),
            UpdateFlags {
                patch: true,
                ..UpdateFlags::FULL
            },
            wall(),
            ms(50),
        )
        .unwrap();
    // The preview runs a script, so the host reports the body it has now.
    let live = sandbug_web::render(frame.live_body().unwrap());
    let response = frame
        .handle_message_with_body(&patch.payload, PARENT, Some(&live), ms(51))
        .unwrap()
        .unwrap();
    let [RenderAction::PatchBody { patches }] = response.actions.as_slice() else {
        panic!("expected a body patch, got {:?}", response.actions);
    };
    assert!(!patches.is_empty());
    let body = sandbug_web::render(frame.live_body().unwrap());
    assert!(body.contains("<p>new body</p>"));
}

#[test]
fn foreign_origins_are_ignored_both_ways() {
    let (mut channel, mut frame) = pair();
    let post = channel
        .update(map("x"), UpdateFlags::FULL, wall(), ms(0))
        .unwrap();
    assert_eq!(
        frame
            .handle_message(&post.payload, "https://evil.test", ms(1))
            .unwrap(),
        None
    );
    let response = frame
        .handle_message(&post.payload, PARENT, ms(2))
        .unwrap()
        .unwrap();
    assert_eq!(
        channel
            .handle_message(&response.ack.payload, "https://evil.test", ms(3))
            .unwrap(),
        None
    );
    assert_eq!(channel.pending_len(), 1);
}

fn relay(channel: &mut PreviewChannel, log: &mut ConsoleLog, post: OutboundPost, at: Duration) {
    assert_eq!(post.target_origin, PARENT);
    match channel.handle_message(&post.payload, FRAME, at).unwrap() {
        Some(ChannelEvent::Console(message)) => log.push(message),
        Some(ChannelEvent::ConsoleClear) => log.clear(),
        other => panic!("unexpected channel event {other:?}"),
    }
}

#[test]
fn console_output_is_relayed_into_the_log() {
    let (mut channel, frame) = pair();
    let mut log = ConsoleLog::new();

    relay(
        &mut channel,
        &mut log,
        frame
            .console(
                ConsoleMethod::Log,
                &["ready".into(), serde_json::json!({ "n": 1 }).into()],
                wall(),
                ms(250),
            )
            .unwrap(),
        ms(250),
    );
    relay(
        &mut channel,
        &mut log,
        frame
            .console(
                ConsoleMethod::Log,
                &[ConsoleArg::error("TypeError", "x is undefined")],
                wall(),
                ms(300),
            )
            .unwrap(),
        ms(300),
    );
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].text(), r#"ready {"n":1}"#);
    assert_eq!(log.entries()[1].method, ConsoleMethod::Error);
    assert_eq!(log.entries()[1].text(), "TypeError: x is undefined");

    relay(
        &mut channel,
        &mut log,
        frame
            .console(ConsoleMethod::Clear, &[], wall(), ms(400))
            .unwrap(),
        ms(400),
    );
    assert!(log.is_empty());
}
