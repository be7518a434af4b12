use dungeon_jazz::theory::interval_frequency;
use dungeon_jazz::{
    drum_beat, read_wav, write_wav, AudioBuffer, ChordEntry, CompositionEngine, CompositionSettings, DrumSequencer,
    DrumVoice, EntryDraft, PitchClass, Project, SynthError, ToneGenerator, SAMPLE_RATE,
};

/// Amplitude of the `freq` component over `samples` (single-bin DFT).
fn magnitude(samples: &[f32], freq: f32) -> f32 {
    let omega = std::f64::consts::TAU * freq as f64 / SAMPLE_RATE as f64;
    let (mut re, mut im) = (0.0f64, 0.0f64);
    for (n, &s) in samples.iter().enumerate() {
        let phase = omega * n as f64;
        re += s as f64 * phase.cos();
        im += s as f64 * phase.sin();
    }
    (2.0 * (re * re + im * im).sqrt() / samples.len() as f64) as f32
}

fn quiet_settings() -> CompositionSettings {
    CompositionSettings { include_noise: false, ..Default::default() }
}

fn one_second(root: &str, chord_type: &str) -> ChordEntry {
    ChordEntry { duration_seconds: 1, include_drums: false, ..ChordEntry::new(root, chord_type) }
}

#[test]
fn single_c_major_entry_holds_three_tones() {
    let engine = CompositionEngine::new();
    let out = engine.compose(&[one_second("C", "Major")], &quiet_settings()).unwrap();

    assert_eq!(out.frames(), 44_100);
    assert_eq!(out.duration_ms(), 1000);
    assert_eq!(out.sample_rate(), SAMPLE_RATE);

    // second half is clear of the 300 ms echo window
    let tail = &out.samples()[22_050..];
    let root = PitchClass::C.base_frequency();
    for interval in [0, 4, 7] {
        let freq = interval_frequency(root, interval);
        assert!(magnitude(tail, freq) > 0.5, "missing {} Hz", freq);
    }
    for freq in [200.0, 300.0, 450.0, 523.25] {
        assert!(magnitude(tail, freq) < 0.1, "unexpected energy at {} Hz", freq);
    }
}

#[test]
fn empty_sequence_is_an_empty_buffer() {
    let out = CompositionEngine::new().compose(&[], &CompositionSettings::default()).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.duration_ms(), 0);
}

#[test]
fn unknown_chord_type_names_the_entry() {
    let entries = vec![one_second("C", "Major"), one_second("D", "Minor"), one_second("C", "Jazz Hands")];
    match CompositionEngine::new().compose(&entries, &quiet_settings()) {
        Err(SynthError::InvalidEntry { index, reason }) => {
            assert_eq!(index, 2);
            assert!(reason.contains("Jazz Hands"));
        }
        other => panic!("expected InvalidEntry, got {:?}", other.map(|b| b.frames())),
    }
}

#[test]
fn unknown_pitch_class_is_a_validation_error() {
    let err = CompositionEngine::new().compose(&[one_second("Cb", "Major")], &quiet_settings()).unwrap_err();
    assert!(matches!(err, SynthError::InvalidEntry { index: 0, .. }));
    assert!(err.to_string().contains("entry 0"));
}

#[test]
fn sections_play_in_order() {
    let engine = CompositionEngine::new();
    let entries = vec![one_second("C", "Major"), one_second("G", "Major")];
    let out = engine.compose(&entries, &quiet_settings()).unwrap();
    assert_eq!(out.frames(), 88_200);

    let c_root = PitchClass::C.base_frequency();
    let g_root = PitchClass::G.base_frequency();
    let first = &out.samples()[22_050..44_100];
    let second = &out.samples()[66_150..88_200];

    assert!(magnitude(first, c_root) > 0.5);
    assert!(magnitude(second, c_root) < 0.1);
    assert!(magnitude(second, interval_frequency(g_root, 4)) > 0.5);
    assert!(magnitude(first, interval_frequency(g_root, 4)) < 0.1);

    let swapped = engine.compose(&[entries[1].clone(), entries[0].clone()], &quiet_settings()).unwrap();
    assert_ne!(swapped, out);
}

#[test]
fn loops_repeat_the_whole_mix() {
    let engine = CompositionEngine::new().with_seed(3);
    let settings = CompositionSettings { loop_count: 3, include_noise: true, ..Default::default() };
    let entry = ChordEntry { include_drums: true, ..one_second("A", "Minor 7th") };
    let out = engine.compose(&[entry], &settings).unwrap();

    assert_eq!(out.frames(), 3 * 44_100);
    let one = &out.samples()[..44_100];
    assert_eq!(&out.samples()[44_100..88_200], one);
    assert_eq!(&out.samples()[88_200..], one);
}

#[test]
fn every_layer_off_is_silence_of_full_length() {
    let settings = CompositionSettings { include_tonal: false, include_noise: false, ..Default::default() };
    let entries = vec![one_second("C", "Major"), ChordEntry { duration_seconds: 2, ..one_second("E", "Minor") }];
    let out = CompositionEngine::new().compose(&entries, &settings).unwrap();
    assert_eq!(out.frames(), 3 * 44_100);
    assert!(out.samples().iter().all(|&s| s == 0.0));
}

#[test]
fn entry_tonal_toggle_keeps_timeline_length() {
    let entries = vec![
        ChordEntry { include_tonal_layer: false, ..one_second("C", "Major") },
        one_second("C", "Major"),
    ];
    let out = CompositionEngine::new().compose(&entries, &quiet_settings()).unwrap();
    assert_eq!(out.frames(), 88_200);
    assert!(out.samples()[..44_100].iter().all(|&s| s == 0.0));
    assert!(out.samples()[44_100..].iter().any(|&s| s != 0.0));
}

#[test]
fn drums_follow_each_entry_flag() {
    // the session drum default only seeds new entries
    let settings = CompositionSettings { include_tonal: false, include_drums: false, ..Default::default() };
    let entries = vec![
        ChordEntry { include_drums: true, ..one_second("C", "Major") },
        ChordEntry { include_drums: false, ..one_second("C", "Major") },
    ];
    let out = CompositionEngine::new().with_seed(5).compose(&entries, &settings).unwrap();
    // echo only folds the first 300 ms, so the second second stays untouched
    assert!(AudioBuffer::mono(out.samples()[..44_100].to_vec(), SAMPLE_RATE).peak() > 0.0);
    assert!(out.samples()[44_100..].iter().all(|&s| s == 0.0));
}

#[test]
fn seeded_engines_render_identically() {
    let settings = CompositionSettings { include_noise: true, ..Default::default() };
    let entries = vec![
        ChordEntry { include_drums: true, is_arpeggio: true, ..one_second("D", "Dominant 7th") },
        ChordEntry { include_drums: true, bpm: 90, time_signature: "3/4".into(), ..one_second("F", "Major 9th") },
    ];
    let a = CompositionEngine::new().with_seed(77).compose(&entries, &settings).unwrap();
    let b = CompositionEngine::new().with_seed(77).compose(&entries, &settings).unwrap();
    let c = CompositionEngine::new().with_seed(78).compose(&entries, &settings).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn drum_skeleton_through_public_api() {
    let seq = DrumSequencer::new(120, "4/4".parse().unwrap()).unwrap();
    let hits = seq.plan(4000, &mut fastrand::Rng::new());
    let kicks: Vec<u64> = hits
        .iter()
        .filter(|h| h.voice == DrumVoice::Kick && !h.fill)
        .map(|h| h.beat_index)
        .collect();
    assert_eq!(kicks, vec![0, 3, 4, 7]);

    let mut tone = ToneGenerator::new(SAMPLE_RATE);
    let out = drum_beat(&mut tone, 4000, 120, "4/4", -10.0).unwrap();
    assert_eq!(out.duration_ms(), 4000);
}

#[test]
fn project_file_to_wav() {
    let dir = tempfile::tempdir().unwrap();
    let project_path = dir.path().join("settings.json");
    let wav_path = dir.path().join("out.wav");

    let settings = CompositionSettings { duration_seconds: 1, loop_count: 2, ..Default::default() };
    let draft = EntryDraft {
        root: "a#".into(),
        chord_type: "Suspended 2nd".into(),
        octave: "3".into(),
        include_drums: true,
        include_tonal_layer: true,
        apply_settings: true,
        bpm: "not a number".into(),
        ..Default::default()
    };
    let project = Project { entries: vec![draft.normalize(&settings)], settings };
    project.save(&project_path).unwrap();

    let loaded = Project::load(&project_path).unwrap();
    assert_eq!(loaded.entries[0].root_pitch_class, "A#");
    assert_eq!(loaded.entries[0].bpm, 120);

    let music = CompositionEngine::new().with_seed(1).compose(&loaded.entries, &loaded.settings).unwrap();
    write_wav(&music, &wav_path).unwrap();
    let back = read_wav(&wav_path).unwrap();
    assert_eq!(back.frames(), 2 * 44_100);
    assert_eq!(back.sample_rate(), SAMPLE_RATE);
}
