mod common;

use std::path::Path;

use covtree::ingest::ingest;
use covtree::model::Counted;

#[test]
fn merge_sums_hit_counts() {
    let dir = common::setup();
    let a = common::write_tracefile(
        dir.path(),
        "run-a.info",
        "SF:/src/lib.rs\nDA:1,3\nDA:2,0\nDA:3,1\nend_of_record\n",
    );
    let b = common::write_tracefile(
        dir.path(),
        "run-b.info",
        "SF:/src/lib.rs\nDA:1,2\nDA:2,1\nDA:3,0\nend_of_record\n",
    );

    let run = ingest(&[b, a], &common::config(), dir.path()).unwrap();

    let counts = run.registry.counts();
    assert_eq!(counts.lines_valid, 3);
    assert_eq!(counts.lines_covered, 3); // all lines now covered

    let file = run.registry.get(Path::new("/src/lib.rs")).unwrap();
    assert_eq!(file.line(1).unwrap().total_hits(), 5); // 3 + 2
    assert_eq!(file.line(2).unwrap().total_hits(), 1); // 0 + 1
    assert_eq!(file.line(3).unwrap().total_hits(), 1); // 1 + 0
}

#[test]
fn same_record_twice_is_additive() {
    let dir = common::setup();
    let content = "SF:/src/a.c\nDA:10,3\nend_of_record\n";
    let a = common::write_tracefile(dir.path(), "a.info", content);
    let b = common::write_tracefile(dir.path(), "b.info", content);

    let run = ingest(&[a, b], &common::config(), dir.path()).unwrap();

    let file = run.registry.get(Path::new("/src/a.c")).unwrap();
    assert_eq!(file.line(10).unwrap().total_hits(), 6);
}

#[test]
fn merge_keeps_test_cases_apart() {
    let dir = common::setup();
    let a = common::write_tracefile(
        dir.path(),
        "unit.info",
        "TN:unit\nSF:/src/lib.rs\nFN:1,process\nFNDA:2,process\nDA:1,2\nDA:2,0\nBRDA:2,0,0,-\nend_of_record\n",
    );
    let b = common::write_tracefile(
        dir.path(),
        "e2e.info",
        "TN:e2e\nSF:/src/lib.rs\nFNDA:3,process\nDA:1,1\nDA:2,4\nBRDA:2,0,0,1\nend_of_record\n",
    );

    let run = ingest(&[a, b], &common::config(), dir.path()).unwrap();

    let names: Vec<&str> = run.test_names.iter().map(String::as_str).collect();
    assert_eq!(names, vec!["e2e", "unit"]);

    let file = run.registry.get(Path::new("/src/lib.rs")).unwrap();
    let function = file.function("process").unwrap();
    assert_eq!(function.hits("unit"), 2);
    assert_eq!(function.hits("e2e"), 3);
    assert_eq!(function.total_hits(), 5);
    assert_eq!(file.functions().count(), 1);

    let line = file.line(2).unwrap();
    assert_eq!(line.hits("unit"), 0);
    assert_eq!(line.hits("e2e"), 4);
    assert_eq!(line.branches().len(), 1);
    assert_eq!(line.branches()[0].hits("unit"), 0);
    assert_eq!(line.branches()[0].hits("e2e"), 1);

    assert_eq!(file.lines_hit_by("unit"), 1);
    assert_eq!(file.lines_hit_by("e2e"), 2);
    assert_eq!(file.branches_hit_by("unit"), 0);
    assert_eq!(file.functions_hit_by("e2e"), 1);
}
