mod common;

use common::{frame, split_frames, Broken};
use native_frame::{echo, host, Channel, FrameConfig, FrameError, MAX_TO_BROWSER};
use std::io::{self, Cursor};

fn run_echo(input: Vec<u8>) -> (Result<u64, FrameError>, Vec<Vec<u8>>) {
    let mut out = Vec::new();
    let result = {
        let mut channel = Channel::new(Cursor::new(input), &mut out);
        host::serve(&mut channel, echo::reply)
    };
    (result, split_frames(&out))
}

#[test]
fn echoes_value_one_exactly_once() {
    let (result, replies) = run_echo(frame(br#"{"value":1}"#));
    assert_eq!(result.unwrap(), 1);
    assert_eq!(replies, vec![br#"{"echo": {"value":1}}"#.to_vec()]);
}

#[test]
fn clean_eof_before_any_frame_is_success() {
    let (result, replies) = run_echo(Vec::new());
    assert_eq!(result.unwrap(), 0);
    assert!(replies.is_empty());
}

#[test]
fn answers_frames_in_order_until_eof() {
    let input = [
        frame(br#"{"ping":"a"}"#),
        frame(b"[1, 2, 3]"),
        frame(br#""text""#),
    ]
    .concat();
    let (result, replies) = run_echo(input);
    assert_eq!(result.unwrap(), 3);
    assert_eq!(
        replies,
        vec![
            br#"{"echo": {"ping":"a"}}"#.to_vec(),
            br#"{"echo": [1, 2, 3]}"#.to_vec(),
            br#"{"echo": "text"}"#.to_vec(),
        ]
    );
}

#[test]
fn invalid_json_gets_error_reply_and_loop_continues() {
    let input = [frame(b"not json"), frame(br#"{"ok":true}"#)].concat();
    let (result, replies) = run_echo(input);
    assert_eq!(result.unwrap(), 2);

    let err: serde_json::Value = serde_json::from_slice(&replies[0]).unwrap();
    assert_eq!(err["error"], "invalid_json");
    assert_eq!(err["bytes_in"], 8);
    assert_eq!(replies[1], br#"{"echo": {"ok":true}}"#);
}

#[test]
fn truncated_frame_after_a_good_one_is_short_read() {
    let mut input = frame(br#"{"value":1}"#);
    input.extend_from_slice(&100u32.to_le_bytes());
    input.extend_from_slice(&[b' '; 50]);

    let (result, replies) = run_echo(input);
    assert!(matches!(
        result,
        Err(FrameError::ShortRead {
            expected: 100,
            received: 50
        })
    ));
    assert_eq!(replies.len(), 1, "the complete frame is still answered");
}

#[test]
fn oversized_header_stops_the_loop() {
    let (result, replies) = run_echo(vec![0xff; 4]);
    assert!(matches!(result, Err(FrameError::InvalidLength { .. })));
    assert!(replies.is_empty());
}

#[test]
fn reply_over_the_browser_limit_is_answered_with_an_error() {
    // Valid JSON well under the 64 MiB inbound cap whose envelope cannot fit in 1 MiB.
    let big = format!("\"{}\"", "a".repeat(1_500_000));
    let input = [frame(big.as_bytes()), frame(br#"{"value":1}"#)].concat();

    let mut out = Vec::new();
    let result = {
        let mut channel = Channel::with_config(Cursor::new(input), &mut out, FrameConfig::browser());
        host::serve(&mut channel, echo::reply)
    };
    let replies = split_frames(&out);

    assert_eq!(result.unwrap(), 2);
    assert_eq!(replies.len(), 2);
    assert!(replies[0].len() <= MAX_TO_BROWSER);
    let err: serde_json::Value = serde_json::from_slice(&replies[0]).unwrap();
    assert_eq!(err["error"], "reply_too_large");
    assert_eq!(err["bytes_in"], big.len());
    assert_eq!(replies[1], br#"{"echo": {"value":1}}"#);
}

#[test]
fn write_failure_propagates() {
    let mut channel = Channel::new(
        Cursor::new(frame(b"{}")),
        Broken(io::ErrorKind::BrokenPipe),
    );
    let err = host::serve(&mut channel, echo::reply).unwrap_err();
    assert!(matches!(err, FrameError::WriteFailure(_)));
}

#[test]
fn custom_handler_sees_raw_payloads() {
    let mut seen = Vec::new();
    let mut channel = Channel::new(Cursor::new([frame(b"a"), frame(b"bc")].concat()), Vec::new());
    host::serve(&mut channel, |p| {
        seen.push(p.len());
        p.to_ascii_uppercase()
    })
    .unwrap();
    let (input, out) = channel.into_inner();

    assert_eq!(seen, [1, 2]);
    assert_eq!(input.position(), 11, "both frames consumed");
    assert_eq!(split_frames(&out), vec![b"A".to_vec(), b"BC".to_vec()]);
}
