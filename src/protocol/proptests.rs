//! Property-based tests for the frame decoder
//!
//! The load-bearing invariant: however the network fragments a well-formed
//! frame sequence into chunks, the decoded frames are identical to decoding
//! the unpartitioned stream.

use super::frame::FrameDecoder;
use proptest::prelude::*;

/// Frame bodies with ASCII and multi-byte characters, never containing a
/// blank-line separator.
fn arb_frame_body() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?\u{e9}\u{fc}\u{2602}\u{1f455}]{0,40}"
}

fn build_stream(bodies: &[String]) -> Vec<u8> {
    let mut stream = String::new();
    for body in bodies {
        stream.push_str(body);
        stream.push_str("\n\n");
    }
    stream.into_bytes()
}

fn decode_whole(bytes: &[u8]) -> Vec<String> {
    let mut dec = FrameDecoder::new();
    dec.push(bytes).expect("well-formed stream decodes")
}

proptest! {
    #[test]
    fn chunk_partition_invariance(
        bodies in prop::collection::vec(arb_frame_body(), 0..8),
        cuts in prop::collection::vec(1usize..24, 0..128),
    ) {
        let bytes = build_stream(&bodies);
        let expected = decode_whole(&bytes);

        let mut dec = FrameDecoder::new();
        let mut got = Vec::new();
        let mut cuts = cuts.into_iter();
        let mut idx = 0;
        while idx < bytes.len() {
            let take = cuts.next().unwrap_or(5).min(bytes.len() - idx);
            got.extend(dec.push(&bytes[idx..idx + take]).expect("partition decodes"));
            idx += take;
        }
        dec.finish();

        prop_assert_eq!(got, expected);
    }

    #[test]
    fn byte_at_a_time_matches_whole(bodies in prop::collection::vec(arb_frame_body(), 0..5)) {
        let bytes = build_stream(&bodies);
        let expected = decode_whole(&bytes);

        let mut dec = FrameDecoder::new();
        let mut got = Vec::new();
        for b in &bytes {
            got.extend(dec.push(std::slice::from_ref(b)).expect("single byte decodes"));
        }

        prop_assert_eq!(got, expected);
    }

    #[test]
    fn trailing_partial_never_panics(
        bodies in prop::collection::vec(arb_frame_body(), 0..4),
        tail in "[a-z:{ ]{0,20}",
    ) {
        let mut bytes = build_stream(&bodies);
        bytes.extend_from_slice(tail.as_bytes());

        let mut dec = FrameDecoder::new();
        let got = dec.push(&bytes).expect("stream decodes");
        dec.finish();

        // The unterminated tail never shows up as a frame.
        let expected = decode_whole(&build_stream(&bodies));
        prop_assert_eq!(got, expected);
    }
}
