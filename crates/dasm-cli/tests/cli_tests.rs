// Integration tests for the dasm binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn dasm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dasm"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run dasm")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_compile_writes_ast_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "shape.smd", "vec2 p = (1, 2);\ntriangle(p, p, p)\n");

    let output = dasm(&["compile", &file]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("shape.json")).unwrap()).unwrap();
    assert_eq!(json["body"][0]["type"], "VariableDeclaration");
    assert_eq!(json["body"][0]["value"]["type"], "VectorLiteral");
    assert_eq!(json["body"][1]["type"], "DrawCall");
    assert_eq!(json["body"][1]["command"], "triangle");
}

#[test]
fn test_compile_error_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "bad.smd", "float x = ;");

    let output = dasm(&["compile", &file, "--stdout"]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_data_to_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "module.dasm",
        "# dd\n@data\nnum a = 1\nvec2[] p = [(1,2),(3,4)]\n@functions\n@program\n",
    );
    let out = dir.path().join("tables.json");

    let output = dasm(&["data", &file, "-o", &out.to_string_lossy()]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["singlets"][0]["name"], "a");
    assert_eq!(json["singlets"][0]["value"], 1.0);
    assert_eq!(json["lists"][0]["values"][1][0], 3.0);
}

#[test]
fn test_data_section_order_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "bad.dasm", "@functions\n");

    let output = dasm(&["data", &file, "--stdout"]);
    assert!(!output.status.success());
}

#[test]
fn test_resolve() {
    assert_eq!(stdout(&dasm(&["resolve", "mul", "num", "vec2"])).trim(), "vec2");
    assert_eq!(stdout(&dasm(&["resolve", "add", "num[]", "num"])).trim(), "num[]");
    assert_eq!(stdout(&dasm(&["resolve", "total", "vec3[]"])).trim(), "vec3");
    assert_eq!(stdout(&dasm(&["resolve", "ret", "vec2"])).trim(), "none");
    assert!(!dasm(&["resolve", "add", "num", "vec2"]).status.success());
    assert!(!dasm(&["resolve", "add", "any", "num"]).status.success());
}

#[test]
fn test_instructions_round_trip_through_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dasm(&["instructions"]);
    assert!(output.status.success());
    let schema = write(dir.path(), "registry.toml", &stdout(&output));

    let output = dasm(&["resolve", "count", "vec3", "--schema", &schema]);
    assert_eq!(stdout(&output).trim(), "num");

    let json = dasm(&["instructions", "--schema", &schema, "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout(&json)).unwrap();
    assert!(value["instruction"].as_array().is_some_and(|a| !a.is_empty()));
}
