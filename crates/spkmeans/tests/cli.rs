use std::io::Write;
use std::process::{Command, Output};

fn run(args: &[&str], input: &str) -> Output {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(input.as_bytes()).unwrap();

    Command::new(env!("CARGO_BIN_EXE_spkmeans"))
        .env_remove("RUST_LOG")
        .args(args)
        .arg(file.path())
        .output()
        .unwrap()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

const TWO_BLOBS: &str = "0,0\n0.5,0.2\n0.3,0.8\n1.0,0.4\n0.6,1.0\n\
                         10,10\n10.4,10.3\n10.2,10.9\n10.8,10.1\n10.5,10.6\n";

#[test]
fn jacobi_goal() {
    let output = run(&["jacobi"], "3,2,4\n2,0,2\n4,2,3\n");
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "-1.0000,-1.0000,8.0000");
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 3);
        assert!(!line.contains("-0.0000"));
    }
}

#[test]
fn wam_goal() {
    let output = run(&["wam"], "0,0\n3,4\n");
    assert!(output.status.success());
    // exp(-5 / 2) = 0.0821
    assert_eq!(
        stdout_lines(&output),
        vec!["0.0000,0.0821".to_owned(), "0.0821,0.0000".to_owned()]
    );
}

#[test]
fn ddg_and_gl_goals() {
    let ddg = run(&["ddg"], "0,0\n3,4\n");
    assert_eq!(
        stdout_lines(&ddg),
        vec!["0.0821,0.0000".to_owned(), "0.0000,0.0821".to_owned()]
    );

    let gl = run(&["gl"], "0,0\n3,4\n");
    assert_eq!(
        stdout_lines(&gl),
        vec!["1.0000,-1.0000".to_owned(), "-1.0000,1.0000".to_owned()]
    );
}

#[test]
fn spk_goal() {
    let output = run(&["-k", "2", "spk"], TWO_BLOBS);
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 3);
    let indices: Vec<usize> = lines[0].split(',').map(|s| s.parse().unwrap()).collect();
    assert_eq!(indices.len(), 2);
    assert!(indices.iter().all(|&i| i < 10));
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 2);
    }
}

#[test]
fn spk_goal_with_eigengap() {
    let output = run(&["spk"], TWO_BLOBS);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output).len(), 3);
}

#[test]
fn successful_run_is_quiet_on_stderr() {
    // Enough points for the eigensolver to run into its rotation cap
    let mut input = String::new();
    for i in 0..12 {
        let x = i as f64 * 0.3;
        input.push_str(&format!("{x},{}\n", (i % 4) as f64 * 0.2));
        input.push_str(&format!("{},{}\n", 8.0 + x, 8.0 - x));
    }

    let output = run(&["spk"], &input);
    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn failures_print_generic_message() {
    for (args, input) in [
        (&["spk", "-k", "10"][..], TWO_BLOBS),
        (&["jacobi"][..], "1,2\n3,4\n"),
        (&["wam"][..], "1,2\n3\n"),
        (&["wam"][..], "1,x\n"),
        (&["nope"][..], "1,2\n"),
    ] {
        let output = run(args, input);
        assert!(!output.status.success(), "{args:?} should fail");
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("An Error Has Occurred"), "{args:?}: {stderr}");
    }
}
