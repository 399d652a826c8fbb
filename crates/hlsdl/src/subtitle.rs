//! WebVTT to SRT conversion.
//!
//! A block-level rewrite: cues are separated by blank lines, the `WEBVTT`
//! header and its metadata lines are dropped and cues without a numeric
//! identifier get a sequential one. Cue payloads and timestamps are copied
//! verbatim.

const HEADER_MARKER: &str = "WEBVTT";
const TIME_SEPARATOR: &str = "-->";

/// Drops the `WEBVTT` line and the metadata under it, keeping anything from
/// the first cue timing line on. `None` when no cue follows in the block.
fn strip_header(block: &str) -> Option<&str> {
    let mut offset = 0;
    for line in block.split('\n') {
        if line.contains(TIME_SEPARATOR) {
            return Some(&block[offset..]);
        }
        offset += line.len() + 1;
    }
    None
}

/// Converts WebVTT text to SRT text.
///
/// Total and deterministic: empty or header-only input gives an empty string,
/// and SRT input comes back unchanged.
pub fn vtt_to_srt(vtt_text: &str) -> String {
    let normalized = vtt_text.replace("\r\n", "\n").replace('\r', "\n");

    let mut blocks: Vec<String> = Vec::new();
    let mut counter = 1usize;

    for block in normalized.split("\n\n") {
        let mut block = block.trim();
        if block.starts_with(HEADER_MARKER) {
            match strip_header(block) {
                Some(cues) => block = cues,
                None => continue,
            }
        }
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines();
        let first = lines.next().unwrap_or_default();
        if first.contains(TIME_SEPARATOR) {
            blocks.push(format!("{counter}\n{block}"));
            counter += 1;
        } else {
            blocks.push(block.to_string());
        }
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_reference_example() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n\n00:00:03.000 --> 00:00:04.000\nWorld";
        assert_eq!(
            vtt_to_srt(vtt),
            "1\n00:00:01.000 --> 00:00:02.000\nHello\n\n2\n00:00:03.000 --> 00:00:04.000\nWorld"
        );
    }

    #[test]
    fn test_second_pass_is_identity() {
        let vtt = "WEBVTT\r\n\r\n00:00:01.000 --> 00:00:02.000\r\nHello\r\nthere\r\n\r\n\r\n00:00:03.000 --> 00:00:04.000\r\nWorld\r\n";
        let once = vtt_to_srt(vtt);
        assert_eq!(vtt_to_srt(&once), once);
    }

    #[test]
    fn test_header_metadata_block_is_dropped() {
        let vtt = "WEBVTT\nX-TIMESTAMP-MAP=MPEGTS:900000,LOCAL:00:00:00.000\n\n00:00:01.000 --> 00:00:02.000\nHi";
        assert_eq!(vtt_to_srt(vtt), "1\n00:00:01.000 --> 00:00:02.000\nHi");
    }

    #[test]
    fn test_cue_directly_under_header_is_kept() {
        let vtt = "WEBVTT\n00:00:01.000 --> 00:00:02.000\nHello\n\n00:00:03.000 --> 00:00:04.000\nWorld";
        assert_eq!(
            vtt_to_srt(vtt),
            "1\n00:00:01.000 --> 00:00:02.000\nHello\n\n2\n00:00:03.000 --> 00:00:04.000\nWorld"
        );

        let with_metadata =
            "WEBVTT\nX-TIMESTAMP-MAP=MPEGTS:900000,LOCAL:00:00:00.000\n00:00:01.000 --> 00:00:02.000\nHi";
        assert_eq!(
            vtt_to_srt(with_metadata),
            "1\n00:00:01.000 --> 00:00:02.000\nHi"
        );
    }

    #[test]
    fn test_concatenated_parts_number_continuously() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nA\n\nWEBVTT\n\n00:00:05.000 --> 00:00:06.000\nB";
        assert_eq!(
            vtt_to_srt(vtt),
            "1\n00:00:01.000 --> 00:00:02.000\nA\n\n2\n00:00:05.000 --> 00:00:06.000\nB"
        );
    }

    #[test]
    fn test_numbered_cues_are_kept() {
        let vtt = "WEBVTT\n\n7\n00:00:01.000 --> 00:00:02.000\nA";
        assert_eq!(vtt_to_srt(vtt), "7\n00:00:01.000 --> 00:00:02.000\nA");
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(vtt_to_srt(""), "");
        assert_eq!(vtt_to_srt("WEBVTT\n\n\n"), "");
    }
}
