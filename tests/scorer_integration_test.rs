//! End-to-end: checkpoint CSV trees -> scorer -> merged table
//!
//! Drawing itself needs a system font, so these tests stop at the table
//! (or at the errors raised before drawing).

mod common;

use common::write_experiment;
use run_scorer::{Averaging, Error, PlotOptions, ScoreSource, Scorer};

#[test]
fn test_load_and_average_from_disk() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "a", &[(10, 2.0), (0, 1.0)]);
    write_experiment(root.path(), "base", "b", &[(0, 3.0), (10, 4.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_many_scores(["a", "b"], "group", &source)
        .unwrap()
        .average_scores()
        .unwrap();

    let avg = scorer.average("group").unwrap();
    assert_eq!(avg.times().collect::<Vec<_>>(), vec![0, 10]);
    assert_eq!(avg.value_at(0), Some(2.0));
    assert_eq!(avg.value_at(10), Some(3.0));
}

#[test]
fn test_loaded_series_strictly_ascending() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(
        root.path(),
        "base",
        "a",
        &[(500, 1.0), (5, 2.0), (50, 3.0), (5000, 4.0)],
    );

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer.add_score("a", "g", &source).unwrap();

    let times: Vec<i64> = scorer.scores()[0].series().times().collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(times, vec![5, 50, 500, 5000]);
}

#[test]
fn test_other_metric_column() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "a", &[(0, 1.0)]);

    let source = ScoreSource::new().experiments_path(root.path()).metric("elo");
    let mut scorer = Scorer::new("elo");
    scorer.add_score("a", "g", &source).unwrap();
    assert_eq!(scorer.scores()[0].series().value_at(0), Some(1000.0));
}

#[test]
fn test_metric_mismatch_from_source() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "a", &[(0, 1.0)]);

    let source = ScoreSource::new().experiments_path(root.path()).metric("elo");
    let mut scorer = Scorer::new("trueskill");
    let err = scorer.add_score("a", "g", &source).unwrap_err();
    assert!(matches!(err, Error::MetricMismatch { .. }));
}

#[test]
fn test_missing_experiment_dir_is_io_error() {
    let root = tempfile::tempdir().unwrap();
    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    let err = scorer.add_score("ghost", "g", &source).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_add_all_scores_dir() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "variant", "seed-2", &[(0, 2.0)]);
    write_experiment(root.path(), "variant", "seed-1", &[(0, 4.0)]);
    // stray file next to the experiment directories
    std::fs::write(root.path().join("variant").join("runs").join("README"), "x").unwrap();

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_all_scores_dir("variant", "v", &source)
        .unwrap()
        .average_scores()
        .unwrap();

    let names: Vec<&str> = scorer.get_group("v").iter().map(|s| s.experiment()).collect();
    assert_eq!(names, vec!["seed-1", "seed-2"]);
    assert_eq!(scorer.average("v").unwrap().value_at(0), Some(3.0));
}

#[test]
fn test_interpolation_across_groups_on_disk() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "coarse", &[(0, 1.0), (10, 3.0)]);
    write_experiment(root.path(), "base", "fine", &[(0, 0.0), (5, 0.5), (10, 1.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_score("coarse", "coarse", &source)
        .unwrap()
        .add_score("fine", "fine", &source)
        .unwrap()
        .average_scores()
        .unwrap();

    let table = scorer.table(None).unwrap();
    table.ensure_complete().unwrap();
    assert_eq!(
        table.rows("coarse").unwrap(),
        vec![(0, Some(1.0)), (5, Some(2.0)), (10, Some(3.0))]
    );
}

#[test]
fn test_runs_of_different_length_carry_last_score() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "short", &[(0, 1.0), (10, 1.0)]);
    write_experiment(root.path(), "base", "long", &[(0, 3.0), (20, 3.0)]);
    write_experiment(root.path(), "base", "other", &[(0, 0.0), (10, 0.0), (20, 0.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_many_scores(["short", "long"], "mixed", &source)
        .unwrap()
        .add_score("other", "other", &source)
        .unwrap()
        .average_scores()
        .unwrap();

    assert_eq!(scorer.average("mixed").unwrap().value_at(20), Some(2.0));
    let table = scorer.table(None).unwrap();
    table.ensure_complete().unwrap();
    assert_eq!(
        table.rows("mixed").unwrap(),
        vec![(0, Some(2.0)), (10, Some(2.0)), (20, Some(2.0))]
    );
}

#[test]
fn test_step_limit_excludes_later_points() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "a", &[(0, 1.0), (10, 2.0), (20, 3.0), (30, 4.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer.add_score("a", "g", &source).unwrap().average_scores().unwrap();

    let table = scorer.table(Some(15)).unwrap();
    assert!(table.times().values().iter().all(|&t| t <= 15));
    assert_eq!(table.num_rows(), 2);
}

#[test]
fn test_draw_avg_fails_fast_on_gaps() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "early", &[(0, 1.0), (10, 2.0)]);
    write_experiment(root.path(), "base", "late", &[(20, 1.0), (30, 2.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_score("early", "early", &source)
        .unwrap()
        .add_score("late", "late", &source)
        .unwrap();

    let out = tempfile::tempdir().unwrap();
    let options = PlotOptions::new("gaps").file("chart").file_dir(out.path().join("plots"));
    let err = scorer.draw_avg(&options).unwrap_err();
    assert!(matches!(err, Error::MissingValues { .. }));
    assert!(!out.path().join("plots").exists());
}

#[test]
fn test_simple_variant_tolerates_gaps() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "a", &[(0, 1.0), (10, 3.0)]);
    write_experiment(root.path(), "base", "b", &[(0, 1.0), (5, 2.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_many_scores(["a", "b"], "g", &source)
        .unwrap()
        .average_scores_with(Averaging::Simple)
        .unwrap();

    let avg = scorer.average("g").unwrap();
    assert_eq!(avg.value_at(0), Some(1.0));
    assert_eq!(avg.value_at(5), Some(2.0));
    assert_eq!(avg.value_at(10), Some(3.0));
}

#[test]
fn test_export_table_csv() {
    let root = tempfile::tempdir().unwrap();
    write_experiment(root.path(), "base", "a", &[(0, 1.0), (10, 2.0)]);
    write_experiment(root.path(), "base", "b", &[(0, 3.0), (10, 4.0)]);

    let source = ScoreSource::new().experiments_path(root.path());
    let mut scorer = Scorer::new("trueskill");
    scorer
        .add_score("a", "first", &source)
        .unwrap()
        .add_score("b", "second", &source)
        .unwrap()
        .average_scores()
        .unwrap();

    let path = root.path().join("export").join("table.csv");
    scorer.table(None).unwrap().write_csv(&path).unwrap();
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "time,first,second\n0,1,3\n10,2,4\n"
    );
}
