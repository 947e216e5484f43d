//! Property-based tests for SSE framing

use doc_intel::{SseDecoder, SseFrame, classify};
use proptest::prelude::*;

fn decode(chunks: &[&[u8]]) -> Vec<SseFrame> {
    let mut decoder = SseDecoder::new();
    let mut frames = Vec::new();
    for chunk in chunks {
        frames.extend(decoder.feed(chunk));
    }
    frames.extend(decoder.finish());
    frames
}

fn split_at_points<'a>(bytes: &'a [u8], points: &[usize]) -> Vec<&'a [u8]> {
    let mut cuts: Vec<usize> = points.iter().map(|p| p % (bytes.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(&bytes[start..cut]);
        start = cut;
    }
    chunks.push(&bytes[start..]);
    chunks
}

fn event_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("event: progress".to_string()),
        Just("event: complete".to_string()),
        Just("event: error".to_string()),
        Just(": comment".to_string()),
        Just(String::new()),
        "[a-z\u{e1}\u{e9}\u{1f3e0} ]{0,12}".prop_map(|m| format!("data: {{\"message\":\"{m}\",\"progress\":1}}")),
        "[a-zA-Z0-9 \u{f3}]{0,20}".prop_map(|s| format!("data: {s}")),
    ]
}

fn stream() -> impl Strategy<Value = String> {
    (prop::collection::vec(event_line(), 0..12), any::<bool>()).prop_map(|(lines, crlf)| {
        let sep = if crlf { "\r\n" } else { "\n" };
        lines.join(sep)
    })
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_frames(
        body in stream(),
        points in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        let bytes = body.as_bytes();
        let whole = decode(&[bytes]);
        let chunks = split_at_points(bytes, &points);
        prop_assert_eq!(decode(&chunks), whole);
    }

    #[test]
    fn byte_at_a_time_matches_whole(body in "(data: [a-z\u{e9}]{0,6}\n|event: [a-z]{1,8}\n){0,8}") {
        let bytes = body.as_bytes();
        let single: Vec<&[u8]> = bytes.chunks(1).collect();
        prop_assert_eq!(decode(&single), decode(&[bytes]));
    }

    #[test]
    fn classify_never_panics(text in "\\PC{0,64}") {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            let _ = classify(None, &value);
            let _ = classify(Some("progress"), &value);
            let _ = classify(Some("complete"), &value);
        }
    }
}
