use crate::models::AudioFormatCandidate;

const AUDIO_MIME_PREFIX: &str = "audio/";

pub fn is_audio_only(candidate: &AudioFormatCandidate) -> bool {
    candidate
        .mime_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with(AUDIO_MIME_PREFIX)
}

/// Picks the highest-bitrate audio-only candidate.
///
/// Ties keep the first one seen. Returns `None` when no candidate has an
/// `audio/*` mime type.
pub fn select_best(candidates: &[AudioFormatCandidate]) -> Option<&AudioFormatCandidate> {
    let mut best: Option<&AudioFormatCandidate> = None;

    for candidate in candidates.iter().filter(|c| is_audio_only(c)) {
        match best {
            Some(current) if candidate.bitrate_bps <= current.bitrate_bps => {}
            _ => best = Some(candidate),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(mime: &str, bitrate: u64, url: &str) -> AudioFormatCandidate {
        AudioFormatCandidate::new(mime, bitrate, url)
    }

    #[test]
    fn test_picks_highest_audio_bitrate() {
        let candidates = vec![
            fmt("audio/mp4; codecs=\"mp4a.40.2\"", 130_000, "aac"),
            fmt("audio/webm; codecs=\"opus\"", 160_000, "opus"),
            fmt("audio/webm; codecs=\"opus\"", 70_000, "opus-low"),
        ];
        assert_eq!(select_best(&candidates).unwrap().url, "opus");
    }

    #[test]
    fn test_never_returns_video() {
        let candidates = vec![
            fmt("video/mp4; codecs=\"avc1.4d401f, mp4a.40.2\"", 2_000_000, "muxed"),
            fmt("video/webm; codecs=\"vp9\"", 1_500_000, "video-only"),
            fmt("audio/mp4", 48_000, "audio"),
        ];
        assert_eq!(select_best(&candidates).unwrap().url, "audio");
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let candidates = vec![
            fmt("audio/webm", 128_000, "first"),
            fmt("audio/mp4", 128_000, "second"),
        ];
        assert_eq!(select_best(&candidates).unwrap().url, "first");
    }

    #[test]
    fn test_no_audio_candidates() {
        assert!(select_best(&[]).is_none());
        let video_only = vec![fmt("video/mp4", 1_000_000, "v")];
        assert!(select_best(&video_only).is_none());
    }

    #[test]
    fn test_mime_prefix_is_case_insensitive() {
        let candidates = vec![fmt("Audio/MPEG", 96_000, "mp3")];
        assert_eq!(select_best(&candidates).unwrap().url, "mp3");
    }

    #[test]
    fn test_maximum_over_many_orderings() {
        let base = [
            fmt("audio/webm", 50_000, "a"),
            fmt("video/mp4", 900_000, "v"),
            fmt("audio/mp4", 256_000, "b"),
            fmt("audio/webm", 128_000, "c"),
        ];
        for rotation in 0..base.len() {
            let mut candidates = base.to_vec();
            candidates.rotate_left(rotation);
            let best = select_best(&candidates).unwrap();
            assert_eq!(best.url, "b");
            assert!(is_audio_only(best));
        }
    }
}
