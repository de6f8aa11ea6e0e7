use proptest::prelude::*;
use pursuit_core::{Evaluation, Label, MasterRecord, Sample, SubtrialId, Trial, TrialKey, Warning};
use pursuit_dataset::{
    DatasetError, JoinError, decode_subtrial, encode_subtrial, join, load_master, read_master,
    save_master, split_by_participant, write_master,
};
use pursuit_kinematics::SamplingConfig;
use tempfile::TempDir;

fn trial(participant: u32, trial: u32, n: usize) -> Trial {
    let samples = (0..n)
        .map(|i| Sample::new(i as f64 * 0.2, (i * 10) as u16, 500, i % 4 == 0))
        .collect();
    Trial::new(TrialKey::new(participant, trial).unwrap(), samples)
}

/// Five sub-trials of two samples each.
fn split_even(t: &Trial) -> Vec<pursuit_core::Subtrial<'_>> {
    (0..5u32)
        .map(|k| {
            let start = k as usize * 2;
            t.subtrial(k + 1, start..start + 2).unwrap()
        })
        .collect()
}

fn eval(id: &str, label: u8) -> Evaluation {
    Evaluation {
        id: id.parse().unwrap(),
        text: format!("assessment of {id}"),
        label: Label::try_from(label).unwrap(),
    }
}

fn all_evals(participant: u32, trial: u32) -> Vec<Evaluation> {
    (1..=5)
        .map(|s| eval(&format!("P{participant}-T{trial}-S{s}"), 2))
        .collect()
}

#[test]
fn missing_evaluation_only_drops_that_subtrial() {
    let t = trial(1, 1, 10);
    let evals: Vec<Evaluation> = all_evals(1, 1)
        .into_iter()
        .filter(|e| e.id.to_string() != "P1-T1-S3")
        .collect();

    let out = join(split_even(&t), evals, None).unwrap();

    let ids: Vec<String> = out.records.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, ["P1-T1-S1", "P1-T1-S2", "P1-T1-S4", "P1-T1-S5"]);
    assert_eq!(
        out.warnings,
        [Warning::UnmatchedSubtrial("P1-T1-S3".parse().unwrap())]
    );
    assert_eq!(out.records[2].samples.as_slice(), &t.samples()[6..8]);
    assert!(out.records[0].features.is_none());
}

#[test]
fn orphan_evaluations_are_reported() {
    let t = trial(2, 1, 10);
    let mut evals = all_evals(2, 1);
    evals.push(eval("P9-T4-S1", 1));

    let out = join(split_even(&t), evals, None).unwrap();
    assert_eq!(out.records.len(), 5);
    assert_eq!(out.orphans(), 1);
    assert_eq!(out.unmatched(), 0);
    assert_eq!(
        out.warnings,
        [Warning::OrphanEvaluation("P9-T4-S1".parse().unwrap())]
    );
}

#[test]
fn duplicate_evaluation_id_halts_join() {
    let t = trial(1, 1, 10);
    let mut evals = all_evals(1, 1);
    evals.push(eval("P1-T1-S2", 3));
    assert_eq!(
        join(split_even(&t), evals, None),
        Err(JoinError::DuplicateId("P1-T1-S2".parse().unwrap()))
    );
}

#[test]
fn same_subtrial_twice_halts_join() {
    let t = trial(1, 1, 10);
    let subs: Vec<_> = split_even(&t).into_iter().chain(split_even(&t)).collect();
    assert_eq!(
        join(subs, all_evals(1, 1), None),
        Err(JoinError::DuplicateSubtrial("P1-T1-S1".parse().unwrap()))
    );
}

#[test]
fn collapsed_subtrial_still_becomes_a_record() {
    let t = trial(5, 3, 10);
    let subs = vec![
        t.subtrial(1, 0..4).unwrap(),
        t.subtrial(2, 4..4).unwrap(),
        t.subtrial(3, 4..4).unwrap(),
        t.subtrial(4, 4..7).unwrap(),
        t.subtrial(5, 7..10).unwrap(),
    ];
    let out = join(subs, all_evals(5, 3), Some(&SamplingConfig::default())).unwrap();
    assert_eq!(out.records.len(), 5);
    assert!(out.records[1].samples.is_empty());
    assert_eq!(out.records[1].features.as_ref().unwrap()["sample_count"], 0.0);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("master_dataset.csv");
    save_master(&path, &out.records).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let empty = r#""{""Timestamp"":{},""X"":{},""Y"":{},""Event"":{}}""#;
    let row = text
        .lines()
        .find(|l| l.starts_with("P5-T3-S2,"))
        .unwrap();
    assert!(row.contains(empty), "{row}");

    let reloaded = load_master(&path).unwrap();
    assert_eq!(reloaded, out.records);
    assert!(reloaded[2].samples.is_empty());
}

#[test]
fn output_order_ignores_input_order() {
    let a = trial(10, 2, 10);
    let b = trial(2, 5, 10);
    let c = trial(2, 1, 10);
    let mut evals: Vec<Evaluation> = [(10, 2), (2, 5), (2, 1)]
        .iter()
        .flat_map(|&(p, t)| all_evals(p, t))
        .collect();

    let mut subs: Vec<_> = [&a, &b, &c].into_iter().flat_map(split_even).collect();
    let forward = join(subs.clone(), evals.clone(), Some(&SamplingConfig::default())).unwrap();

    subs.reverse();
    evals.reverse();
    let backward = join(subs.clone(), evals.clone(), Some(&SamplingConfig::default())).unwrap();
    assert_eq!(forward, backward);

    let again = join(subs, evals, Some(&SamplingConfig::default())).unwrap();
    assert_eq!(forward, again);

    let ids: Vec<SubtrialId> = forward.records.iter().map(|r| r.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids[0].to_string(), "P2-T1-S1");
    assert_eq!(ids[14].to_string(), "P10-T2-S5");
    assert!(forward.records.iter().all(|r| r.features.is_some()));
}

#[test]
fn master_file_round_trips() {
    let t = trial(3, 4, 10);
    let out = join(split_even(&t), all_evals(3, 4), Some(&SamplingConfig::default())).unwrap();
    let mut records = out.records;
    records[1].text = "Quotes \"inside\", commas,\nand newlines".to_string();
    records[2].features = None;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("processed").join("master_dataset.csv");
    save_master(&path, &records).unwrap();
    assert_eq!(load_master(&path).unwrap(), records);
}

#[test]
fn master_without_feature_column_is_accepted() {
    let body = "id,text,label,Subtrial\n\
                P1-T1-S1,steady,2,\"{\"\"Timestamp\"\":{\"\"0\"\":0.0},\"\"X\"\":{\"\"0\"\":5},\"\"Y\"\":{\"\"0\"\":6},\"\"Event\"\":{\"\"0\"\":1}}\"\n";
    let records = read_master(body.as_bytes()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].samples, [Sample::new(0.0, 5, 6, true)]);
    assert_eq!(records[0].features, None);
}

#[test]
fn master_reader_is_strict() {
    let mut buf = Vec::new();
    let t = trial(1, 1, 10);
    let out = join(split_even(&t), all_evals(1, 1), None).unwrap();
    write_master(&mut buf, &out.records).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let bad_label = text.replacen(",2,", ",7,", 1);
    assert!(matches!(
        read_master(bad_label.as_bytes()),
        Err(DatasetError::Row { field: "label", .. })
    ));

    let bad_header = text.replacen("Subtrial", "subtrial", 1);
    assert!(matches!(
        read_master(bad_header.as_bytes()),
        Err(DatasetError::Schema(_))
    ));

    let mut lines: Vec<&str> = text.lines().collect();
    lines.push(lines[1]);
    let duplicated = lines.join("\n");
    assert!(matches!(
        read_master(duplicated.as_bytes()),
        Err(DatasetError::Join(JoinError::DuplicateId(_)))
    ));
}

fn record(p: u32, t: u32, s: u32) -> MasterRecord {
    MasterRecord {
        id: SubtrialId::new(p, t, s).unwrap(),
        text: "x".to_string(),
        label: Label::try_from(1).unwrap(),
        samples: Vec::new(),
        features: None,
    }
}

#[test]
fn split_keeps_participants_whole_and_is_seeded() {
    let records: Vec<MasterRecord> = (1..=10)
        .flat_map(|p| (1..=5).map(move |t| record(p, t, 1)))
        .collect();

    let a = split_by_participant(records.clone(), 0.2, 42).unwrap();
    let b = split_by_participant(records.clone(), 0.2, 42).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.test_participants.len(), 2);
    assert_eq!(a.test.len(), 10);
    assert_eq!(a.train.len(), 40);
    assert!(
        a.train
            .iter()
            .all(|r| !a.test_participants.contains(&r.id.participant()))
    );

    let tiny = split_by_participant(records.clone(), 0.01, 1).unwrap();
    assert_eq!(tiny.test_participants.len(), 1);
    assert!(split_by_participant(records.clone(), 0.0, 1).unwrap().test.is_empty());
    assert!(split_by_participant(records.clone(), 1.0, 1).unwrap().train.is_empty());
    assert!(matches!(
        split_by_participant(records, 1.5, 1),
        Err(DatasetError::TestFraction(_))
    ));
}

fn samples_strategy() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec(
        (0.0..1.0e4f64, 0..=1000u16, 0..=1000u16, any::<bool>()),
        0..64,
    )
    .prop_map(|rows| {
        let mut t = 0.0;
        rows.into_iter()
            .map(|(dt, x, y, e)| {
                t += dt;
                Sample::new(t, x, y, e)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn subtrial_column_round_trips(samples in samples_strategy()) {
        let json = encode_subtrial(&samples).unwrap();
        prop_assert_eq!(decode_subtrial(&json).unwrap(), samples);
    }
}
