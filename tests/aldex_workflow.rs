//! Integration tests for the ALDEx2 adapter, CLR extraction and plots.
//!
//! ALDEx2 is replaced by a deterministic in-process routine so the tests run
//! without an R installation.

use aldex_bridge::data::result::{DIFF_BTW, EFFECT, RAB_ALL, WE_EBH};
use aldex_bridge::prelude::*;
use approx::assert_relative_eq;
use nalgebra::DMatrix;
use std::io::Write;
use tempfile::NamedTempFile;

/// What the routine was asked to do.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Run {
        features: Vec<String>,
        samples: Vec<String>,
        conditions: Vec<String>,
        mc_samples: usize,
        test: AldexTest,
    },
    Clr {
        features: Vec<String>,
        mc_samples: usize,
        instance: usize,
    },
}

#[derive(Default)]
struct MockRoutine {
    calls: Vec<Call>,
    failure: Option<String>,
}

impl MockRoutine {
    fn failing(message: &str) -> Self {
        Self {
            calls: Vec::new(),
            failure: Some(message.to_string()),
        }
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(DaaError::External(message.clone())),
            None => Ok(()),
        }
    }
}

/// clr of `counts + 0.5`, shifted by `instance` so instances differ.
fn mock_clr(counts: &CountMatrix, instance: usize) -> DMatrix<f64> {
    let n_features = counts.n_features();
    let logs = DMatrix::from_fn(n_features, counts.n_samples(), |i, j| {
        (counts.get(i, j) as f64 + 0.5).ln()
    });
    DMatrix::from_fn(n_features, counts.n_samples(), |i, j| {
        let mean = logs.column(j).sum() / n_features as f64;
        logs[(i, j)] - mean + instance as f64 * 0.25
    })
}

impl AldexRoutine for MockRoutine {
    fn run(
        &mut self,
        counts: &CountMatrix,
        conditions: &[String],
        mc_samples: usize,
        test: AldexTest,
    ) -> Result<AldexResult> {
        self.calls.push(Call::Run {
            features: counts.feature_ids().to_vec(),
            samples: counts.sample_ids().to_vec(),
            conditions: conditions.to_vec(),
            mc_samples,
            test,
        });
        self.check_failure()?;

        let clr = mock_clr(counts, 0);
        let first = &conditions[0];
        let mut rab = Vec::new();
        let mut diff = Vec::new();
        let mut effect = Vec::new();
        let mut p = Vec::new();
        for i in 0..counts.n_features() {
            let (mut a, mut na, mut b, mut nb) = (0.0, 0.0, 0.0, 0.0);
            for (j, cond) in conditions.iter().enumerate() {
                if cond == first {
                    a += clr[(i, j)];
                    na += 1.0;
                } else {
                    b += clr[(i, j)];
                    nb += 1.0;
                }
            }
            let d = b / nb - a / na;
            rab.push(clr.row(i).sum() / counts.n_samples() as f64);
            diff.push(d);
            effect.push(d / 1.5);
            p.push(if d.abs() > 1.0 { 0.01 } else { 0.6 });
        }

        AldexResult::new(
            counts.feature_ids().to_vec(),
            vec![
                ResultColumn { name: RAB_ALL.into(), values: rab },
                ResultColumn { name: DIFF_BTW.into(), values: diff },
                ResultColumn { name: EFFECT.into(), values: effect },
                ResultColumn { name: WE_EBH.into(), values: p },
            ],
        )
    }

    fn clr_instance(
        &mut self,
        counts: &CountMatrix,
        _conditions: &[String],
        mc_samples: usize,
        instance: usize,
    ) -> Result<DMatrix<f64>> {
        self.calls.push(Call::Clr {
            features: counts.feature_ids().to_vec(),
            mc_samples,
            instance,
        });
        self.check_failure()?;
        Ok(mock_clr(counts, instance))
    }
}

/// 6 features × 8 samples: features 0-1 up in treatment, feature 5 all zero.
fn create_counts() -> CountMatrix {
    let n_samples = 8;
    let rows: Vec<Vec<u64>> = (0..6)
        .map(|feat| {
            (0..n_samples)
                .map(|s| {
                    let treated = s >= 3;
                    match feat {
                        0 | 1 => if treated { 200 + s as u64 * 3 } else { 20 + s as u64 },
                        2..=4 => 100 + ((feat * 7 + s) % 5) as u64,
                        _ => 0,
                    }
                })
                .collect()
        })
        .collect();

    CountMatrix::from_rows(
        &rows,
        (0..6).map(|i| format!("taxon_{}", i)).collect(),
        (0..n_samples).map(|i| format!("sample_{}", i)).collect(),
    )
    .unwrap()
}

/// Metadata rows in a different order than the count columns; 3 control, 5 treatment.
fn create_metadata() -> Metadata {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "sample_id\tgroup\tbatch").unwrap();
    for i in (0..8).rev() {
        let group = if i < 3 { "control" } else { "treatment" };
        let batch = if i % 2 == 0 { "A" } else { "B" };
        writeln!(file, "sample_{}\t{}\t{}", i, group, batch).unwrap();
    }
    file.flush().unwrap();
    Metadata::from_tsv(file.path()).unwrap()
}

fn expected_conditions() -> Vec<String> {
    (0..8)
        .map(|i| if i < 3 { "control" } else { "treatment" }.to_string())
        .collect()
}

#[test]
fn test_run_aligns_and_sizes_monte_carlo() {
    let _ = env_logger::builder().is_test(true).try_init();
    let counts = create_counts();
    let metadata = create_metadata();
    let mut routine = MockRoutine::default();

    let result = run_aldex(&mut routine, &counts, &metadata, AldexTest::T, McSamples::Auto).unwrap();

    assert_eq!(routine.calls.len(), 1);
    match &routine.calls[0] {
        Call::Run {
            samples,
            conditions,
            mc_samples,
            test,
            ..
        } => {
            assert_eq!(samples, counts.sample_ids());
            assert_eq!(conditions, &expected_conditions());
            assert_eq!(*mc_samples, 1000 / 3);
            assert_eq!(*test, AldexTest::T);
        }
        other => panic!("unexpected call {:?}", other),
    }

    assert_eq!(result.len(), 6);
    let diff = result.column(DIFF_BTW).unwrap();
    assert!(diff[0] > 1.0);
    assert!(diff[1] > 1.0);
    assert_eq!(result.significant_at(WE_EBH, 0.05).unwrap(), vec!["taxon_0", "taxon_1"]);
}

#[test]
fn test_run_transposes_samples_by_features_input() {
    let counts = create_counts().transpose().unwrap();
    let metadata = create_metadata();
    let mut routine = MockRoutine::default();

    run_aldex(&mut routine, &counts, &metadata, AldexTest::Kw, McSamples::Fixed(128)).unwrap();

    match &routine.calls[0] {
        Call::Run {
            features,
            samples,
            conditions,
            mc_samples,
            test,
        } => {
            assert_eq!(features.len(), 6);
            assert_eq!(samples.len(), metadata.n_samples());
            assert_eq!(conditions, &expected_conditions());
            assert_eq!(*mc_samples, 128);
            assert_eq!(*test, AldexTest::Kw);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn test_group_column_selection() {
    let counts = create_counts();
    let metadata = create_metadata();
    let mut routine = MockRoutine::default();

    Aldex::new()
        .group_column("batch")
        .run(&mut routine, &counts, &metadata)
        .unwrap();

    match &routine.calls[0] {
        Call::Run {
            conditions,
            mc_samples,
            ..
        } => {
            assert_eq!(conditions[0], "A");
            assert_eq!(conditions[1], "B");
            // Four samples per batch.
            assert_eq!(*mc_samples, 250);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn test_shape_mismatch_fails_before_routine() {
    let counts = create_counts();
    let metadata = Metadata::from_labels(
        "group",
        vec![("sample_0", "a"), ("sample_1", "b"), ("sample_2", "a")],
    )
    .unwrap();
    let mut routine = MockRoutine::default();

    let err = run_aldex(&mut routine, &counts, &metadata, AldexTest::T, McSamples::Auto).unwrap_err();
    assert!(matches!(err, DaaError::DimensionMismatch { expected: 3, .. }));
    assert!(routine.calls.is_empty());
}

#[test]
fn test_routine_errors_pass_through() {
    let mut routine = MockRoutine::failing("Error in aldex.clr: not enough samples");

    let err = run_aldex(
        &mut routine,
        &create_counts(),
        &create_metadata(),
        AldexTest::Glm,
        McSamples::Auto,
    )
    .unwrap_err();

    match err {
        DaaError::External(message) => assert_eq!(message, "Error in aldex.clr: not enough samples"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_median_clr_drops_zero_features() {
    let counts = create_counts();
    let metadata = create_metadata();
    let mut routine = MockRoutine::default();

    let clr = extract_median_clr(
        &mut routine,
        &counts,
        &metadata,
        McSamples::Fixed(16),
        Some(&[0, 1, 2]),
    )
    .unwrap();

    assert_eq!(clr.n_features(), 5);
    assert_eq!(clr.n_samples(), 8);
    assert!(!clr.feature_ids.contains(&"taxon_5".to_string()));
    assert_eq!(clr.n_instances, 3);
    assert_eq!(clr.transformation, "median-CLR");

    assert_eq!(routine.calls.len(), 3);
    for (call, expected_instance) in routine.calls.iter().zip(0..) {
        match call {
            Call::Clr {
                features,
                mc_samples,
                instance,
            } => {
                assert_eq!(features.len(), 5);
                assert_eq!(*mc_samples, 16);
                assert_eq!(*instance, expected_instance);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    // Instance shifts are 0, 0.25 and 0.5: the median is the middle one.
    let (filtered, _) = drop_zero_features(&counts).unwrap();
    let middle = mock_clr(&filtered, 1);
    for i in 0..clr.n_features() {
        for j in 0..clr.n_samples() {
            assert_relative_eq!(clr.get(i, j), middle[(i, j)], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_median_clr_independent_of_instance_order() {
    let counts = create_counts();
    let metadata = create_metadata();

    let forward = extract_median_clr(
        &mut MockRoutine::default(),
        &counts,
        &metadata,
        McSamples::Fixed(8),
        Some(&[0, 3, 5, 7]),
    )
    .unwrap();
    let shuffled = extract_median_clr(
        &mut MockRoutine::default(),
        &counts,
        &metadata,
        McSamples::Fixed(8),
        Some(&[5, 7, 0, 3]),
    )
    .unwrap();

    assert_eq!(forward.matrix(), shuffled.matrix());
}

#[test]
fn test_median_clr_uses_all_instances_by_default() {
    let mut routine = MockRoutine::default();
    let clr = extract_median_clr(
        &mut routine,
        &create_counts(),
        &create_metadata(),
        McSamples::Fixed(4),
        None,
    )
    .unwrap();

    assert_eq!(clr.n_instances, 4);
    assert_eq!(routine.calls.len(), 4);
}

#[test]
fn test_median_clr_rejects_bad_instances() {
    let counts = create_counts();
    let metadata = create_metadata();

    let out_of_range = extract_median_clr(
        &mut MockRoutine::default(),
        &counts,
        &metadata,
        McSamples::Fixed(4),
        Some(&[1, 4]),
    );
    assert!(matches!(out_of_range, Err(DaaError::InvalidParameter(_))));

    let empty = extract_median_clr(
        &mut MockRoutine::default(),
        &counts,
        &metadata,
        McSamples::Fixed(4),
        Some(&[]),
    );
    assert!(matches!(empty, Err(DaaError::InvalidParameter(_))));
}

#[test]
fn test_configured_run_and_plots() {
    let config = AldexConfig::from_yaml(
        "\
test: t
mc_samples: auto
group_column: group
clr_instances: [0, 1, 2, 3, 4]
plot:
  effect_threshold: 0.8
",
    )
    .unwrap();
    let counts = create_counts();
    let metadata = create_metadata();
    let mut routine = MockRoutine::default();
    let aldex = Aldex::from_config(&config);

    let result = aldex.run(&mut routine, &counts, &metadata).unwrap();
    let clr = aldex.clr(&mut routine, &counts, &metadata).unwrap();
    assert_eq!(clr.n_instances, 5);

    let ma = ma_plot(&result, &config.plot).unwrap();
    let volcano = volcano_plot(&result, &config.plot).unwrap();
    assert!(ma.svg.contains("<svg"));
    assert!(volcano.svg.contains("<svg"));

    let dir = tempfile::tempdir().unwrap();
    ma.save(dir.path().join("ma.svg")).unwrap();
    volcano.save(dir.path().join("volcano.svg")).unwrap();
    assert!(dir.path().join("volcano.svg").is_file());
}

/// Runs the bundled script through a local R installation with ALDEx2.
#[test]
#[ignore = "requires Rscript with ALDEx2 installed"]
fn test_rscript_routine_end_to_end() {
    let mut routine = RscriptRoutine::bundled();
    let result = run_aldex(
        &mut routine,
        &create_counts(),
        &create_metadata(),
        AldexTest::T,
        McSamples::Fixed(16),
    )
    .unwrap();

    assert_eq!(result.len(), 5);
    assert!(result.column(EFFECT).is_some());
    assert!(result.column(WE_EBH).is_some());
}
