use super::*;

#[test]
fn parses_whisper_segments() {
    let body = r#"{
        "text": " hello world next point",
        "language": "en",
        "segments": [
            {"id": 0, "seek": 0, "start": 0.0, "end": 2.0, "text": " hello world"},
            {"id": 1, "seek": 0, "start": 2.0, "end": 5.0, "text": " next point"}
        ]
    }"#;

    let entries = parse_whisper_json(body).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, " hello world");
    assert_eq!(entries[0].start, 0.0);
    assert_eq!(entries[1].end, 5.0);
}

#[test]
fn missing_segments_key_yields_empty_transcript() {
    let entries = parse_whisper_json(r#"{"text": "quiet"}"#).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn invalid_json_is_malformed_transcript() {
    assert!(matches!(
        parse_whisper_json("{"),
        Err(PodreelError::MalformedTranscript(_))
    ));
}

#[test]
fn output_path_uses_audio_stem() {
    use std::path::Path;

    let path = whisper_output_path(Path::new("/tmp/episode-01.mp3"), Path::new("/work")).unwrap();
    assert_eq!(path, Path::new("/work/episode-01.json"));
}
