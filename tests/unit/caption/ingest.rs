use super::*;

struct Fixed(Option<Vec<TranscriptRecord>>);

impl Transcriber for Fixed {
    fn transcribe(&mut self, _video: &Path) -> anyhow::Result<Vec<TranscriptRecord>> {
        self.0
            .clone()
            .ok_or_else(|| anyhow::anyhow!("quota exceeded (status 429)"))
    }
}

#[test]
fn parse_and_wrap_generates_stable_ids() {
    let records = parse_transcript_json(
        r#"[{"text":"Zdravo svete","start":0,"end":2},{"text":"Ćao","start":2,"end":2.5}]"#,
    )
    .unwrap();
    let caps = captions_from_records(records, 1700);
    assert_eq!(caps.len(), 2);
    assert_eq!(caps[0].id.as_str(), "caption-0-1700");
    assert_eq!(caps[1].id.as_str(), "caption-1-1700");
    assert_eq!(caps[1].text, "Ćao");
    assert_eq!(caps[1].end, 2.5);
}

#[test]
fn empty_body_is_no_records() {
    assert!(parse_transcript_json("  ").unwrap().is_empty());
    assert!(parse_transcript_json("[]").unwrap().is_empty());
    assert!(parse_transcript_json("{\"oops\":1}").is_err());
}

#[test]
fn failures_collapse_to_one_message() {
    let mut t = Fixed(None);
    let err = transcribe_captions(&mut t, Path::new("in.mp4"), 1).unwrap_err();
    match err {
        CaptionError::Transcription(msg) => {
            assert_eq!(msg, TRANSCRIPTION_FAILED_MESSAGE);
            assert!(!msg.contains("429"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn success_wraps_records() {
    let mut t = Fixed(Some(vec![TranscriptRecord {
        text: "jedan".into(),
        start: 0.0,
        end: 1.0,
    }]));
    let caps = transcribe_captions(&mut t, Path::new("in.mp4"), 9).unwrap();
    assert_eq!(caps[0].id.as_str(), "caption-0-9");
}
