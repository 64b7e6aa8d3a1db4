use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reweight-ghep"))
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn status(dir: &Path, args: &[&str]) -> i32 {
    run_in(dir, args).status.code().unwrap_or(-1)
}

const CONFIG: &str = r#"
parameters:
  - name: MKSPP_Enuq0q3_response
    responses: [1.05]
"#;

#[test]
fn help_as_sole_argument_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    for flag in ["--help", "-?"] {
        let out = run_in(dir.path(), &[flag]);
        assert_eq!(out.status.code(), Some(0), "{flag}");
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("Usage"), "{flag}: {stdout}");
    }
}

#[test]
fn wrong_argument_count_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(status(dir.path(), &[]), 1);
    assert_eq!(status(dir.path(), &["only.yaml"]), 1);
    assert_eq!(status(dir.path(), &["a.yaml", "b.root", "c"]), 1);
    assert_eq!(status(dir.path(), &["--help", "x"]), 1);

    let out = run_in(dir.path(), &["only.yaml"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[ERROR]: Expected to be passed 2 parameters."));
}

#[test]
fn non_root_input_exits_with_open_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ok.yaml"), CONFIG).unwrap();
    let noise: Vec<u8> = (0..2000u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
    std::fs::write(dir.path().join("big.root"), noise).unwrap();

    assert_eq!(status(dir.path(), &["ok.yaml", "big.root"]), 2);
    assert_eq!(status(dir.path(), &["ok.yaml", "absent.root"]), 2);
    assert!(!dir.path().join("wout.root").exists());
}

#[test]
fn bad_configuration_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.yaml"), "parameters: [{ name: x }]\n").unwrap();
    assert_eq!(status(dir.path(), &["bad.yaml", "absent.root"]), 5);
}
