use std::fs;

use codetable::{compile, CompileError, Compiler, Config, DuplicatePolicy, Sink, Stage};

const REFERENCE_INPUT: &str = "17\tAcme Corp\n\n5\tBolt \"Inc\"\tignored-extra-field\n";
const REFERENCE_OUTPUT: &str = "    match code {
        17 => \"Acme Corp\",
        5 => \"Bolt \\\"Inc\\\"\",
        _ => \"Unknown company code\",
    }
";

fn config_for(dir: &tempfile::TempDir, input: &str) -> Config {
    let input_path = dir.path().join("company_ids.txt");
    fs::write(&input_path, input).unwrap();
    Config {
        input_path: Some(input_path),
        output_path: Some(dir.path().join("match_statement.rs")),
        ..Config::default()
    }
}

#[test]
fn reference_table_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, REFERENCE_INPUT);
    let out = cfg.output_path.clone().unwrap();

    let summary = compile(cfg).unwrap();
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.skipped_lines, [2]);
    assert_eq!(summary.output.as_deref(), Some(out.as_path()));
    assert_eq!(fs::read_to_string(&out).unwrap(), REFERENCE_OUTPUT);
}

#[test]
fn missing_input_leaves_output_alone() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("match_statement.rs");
    let cfg = Config {
        input_path: Some(dir.path().join("absent.txt")),
        output_path: Some(out.clone()),
        ..Config::default()
    };
    let err = compile(cfg.clone()).unwrap_err();
    assert!(matches!(err, CompileError::InputNotFound { .. }));
    assert!(!out.exists());

    fs::write(&out, "previous").unwrap();
    let mut compiler = Compiler::new(cfg);
    assert!(compiler.run(&Sink::File(out.clone())).is_err());
    assert_eq!(compiler.stage(), Stage::Failed);
    assert_eq!(fs::read_to_string(&out).unwrap(), "previous");
}

#[test]
fn duplicate_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, "42\tFirst\n42\tSecond\n");
    let out = cfg.output_path.clone().unwrap();
    fs::write(&out, "previous").unwrap();

    let err = compile(cfg).unwrap_err();
    assert!(matches!(
        err,
        CompileError::DuplicateCode { first_line: 1, line: 2, .. }
    ));
    assert_eq!(fs::read_to_string(&out).unwrap(), "previous");
}

#[test]
fn duplicate_policies_pick_one_arm() {
    for (policy, expected) in [
        (DuplicatePolicy::KeepFirst, "42 => \"First\","),
        (DuplicatePolicy::KeepLast, "42 => \"Second\","),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            duplicate_policy: policy,
            ..config_for(&dir, "42\tFirst\n42\tSecond\n")
        };
        let compiled = Compiler::new(cfg).run(&Sink::Memory).unwrap();
        let text = compiled.artifact.as_str();
        assert_eq!(text.matches("42 =>").count(), 1, "{policy:?}");
        assert!(text.contains(expected), "{policy:?}: {text}");
        assert_eq!(compiled.summary.skipped, 1);
    }
}

#[test]
fn unwritable_destination_is_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, "1\tOne\n");
    let out = dir.path().join("no_such_dir").join("out.rs");
    let mut compiler = Compiler::new(cfg);
    let err = compiler.run(&Sink::File(out.clone())).unwrap_err();
    assert!(matches!(err, CompileError::OutputWriteFailure { .. }));
    assert_eq!(compiler.stage(), Stage::Failed);
    assert!(!out.exists());
}

#[test]
fn check_reports_staleness_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, REFERENCE_INPUT);
    let out = cfg.output_path.clone().unwrap();

    let compiled = Compiler::new(cfg.clone())
        .run(&Sink::Check(out.clone()))
        .unwrap();
    assert_eq!(compiled.summary.up_to_date, Some(false));
    assert!(!out.exists());

    fs::write(&out, REFERENCE_OUTPUT).unwrap();
    let mut compiler = Compiler::new(cfg);
    let compiled = compiler.run(&Sink::Check(out)).unwrap();
    assert_eq!(compiled.summary.up_to_date, Some(true));
    assert_eq!(compiler.stage(), Stage::Done);
}

#[test]
fn unreadable_check_target_is_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, REFERENCE_INPUT);
    // a directory exists but cannot be read as a file
    let target = dir.path().join("fragment_dir");
    fs::create_dir(&target).unwrap();

    let err = Compiler::new(cfg).run(&Sink::Check(target.clone())).unwrap_err();
    match err {
        CompileError::OutputUnreadable { path, .. } => assert_eq!(path, target),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_error_names_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, "7\tA\n0x7\tB\n");
    let err = compile(cfg).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("company_ids.txt"), "{msg}");
    assert!(msg.contains("line 2"), "{msg}");
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir, "3\tC\n1\tA \"quoted\"\n2\tB\\slash\n");
    let out = cfg.output_path.clone().unwrap();
    compile(cfg.clone()).unwrap();
    let first = fs::read(&out).unwrap();
    compile(cfg).unwrap();
    assert_eq!(first, fs::read(&out).unwrap());
}

#[test]
fn invalid_scrutinee_rejected_as_config() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        scrutinee: "a.b".into(),
        ..config_for(&dir, "1\tOne\n")
    };
    let err = Compiler::new(cfg).run(&Sink::Memory).unwrap_err();
    assert!(matches!(err, CompileError::Config(_)));
}
