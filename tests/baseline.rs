mod common;

use std::path::Path;

use covtree::config::Config;
use covtree::error::CovtreeError;
use covtree::ingest::ingest;
use covtree::model::{Counted, NON_EXECUTABLE};

const TRACE: &str = "\
TN:unit
SF:/src/lib.rs
FN:1,main
FN:9,helper
FNDA:4,main
FNDA:0,helper
DA:1,4
DA:2,4
DA:3,0
DA:9,0
BRDA:2,0,0,4
BRDA:2,0,1,-
end_of_record
";

#[test]
fn baseline_against_itself_cancels_every_hit() {
    let dir = common::setup();
    let trace = common::write_tracefile(dir.path(), "app.info", TRACE);
    let base = common::write_tracefile(dir.path(), "base.info", TRACE);
    let config = Config {
        baseline_file: Some(base),
        ..common::config()
    };

    let run = ingest(&[trace], &config, dir.path()).unwrap();
    let baseline_stats = run.summary.baseline.as_ref().unwrap();
    assert_eq!(baseline_stats.violations, 0);
    assert_eq!(baseline_stats.skipped, 0);

    let file = run.registry.get(Path::new("/src/lib.rs")).unwrap();
    for line in file.lines() {
        assert!(line.total_hits() == 0 || line.total_hits() == NON_EXECUTABLE);
    }
    for function in file.functions() {
        assert_eq!(function.total_hits(), 0);
    }

    // valid counts survive, only hits go
    let counts = file.counts();
    assert_eq!(counts.lines_valid, 4);
    assert_eq!(counts.lines_covered, 0);
    assert_eq!(counts.functions_valid, 2);
    assert_eq!(counts.functions_covered, 0);
    assert_eq!(counts.branches_valid, 2);
    assert_eq!(counts.branches_covered, 0);
}

#[test]
fn baseline_produces_a_delta() {
    let dir = common::setup();
    let trace = common::write_tracefile(
        dir.path(),
        "app.info",
        "SF:/src/lib.rs\nDA:1,10\nDA:2,1\nDA:3,0\nend_of_record\n",
    );
    let base = common::write_tracefile(
        dir.path(),
        "base.info",
        "SF:/src/lib.rs\nDA:1,4\nDA:2,5\nDA:3,7\nend_of_record\nSF:/src/other.rs\nDA:1,1\nend_of_record\n",
    );
    let config = Config {
        baseline_file: Some(base),
        ..common::config()
    };

    let run = ingest(&[trace], &config, dir.path()).unwrap();

    // files only named in the baseline are not created
    assert_eq!(run.registry.len(), 1);
    let file = run.registry.get(Path::new("/src/lib.rs")).unwrap();
    assert_eq!(file.line(1).unwrap().total_hits(), 6);
    assert_eq!(file.line(2).unwrap().total_hits(), 0);
    assert_eq!(file.line(3).unwrap().total_hits(), 0);
}

#[test]
fn missing_baseline_is_fatal() {
    let dir = common::setup();
    let trace = common::write_tracefile(dir.path(), "app.info", TRACE);
    let config = Config {
        baseline_file: Some(dir.path().join("nope.info")),
        ..common::config()
    };

    let err = ingest(&[trace], &config, dir.path()).unwrap_err();
    assert!(matches!(err, CovtreeError::TraceFile { .. }));
}
