use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_refdoc")));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read(dir: &TempDir, relative: &str) -> String {
    std::fs::read_to_string(dir.path().join(relative))
        .unwrap_or_else(|e| panic!("missing {}: {}", relative, e))
}

// -- stdin mode --

#[test]
fn stdin_mode_prints_index() {
    let input = std::fs::read_to_string(fixture_path("shapes.json")).unwrap();

    cmd()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# API Reference\n"))
        .stdout(predicate::str::contains("[\\\\Geo\\\\Circle](classes/Geo.Circle.md)"))
        .stdout(predicate::str::contains("[src/Geo/Shape.php](files/src.Geo.Shape.php.md)"));
}

#[test]
fn stdin_mode_rejects_malformed_manifest() {
    cmd()
        .write_stdin("{ \"files\": [")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid manifest"));
}

// -- file mode --

#[test]
fn file_mode_writes_every_page() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    for page in [
        "index.md",
        "classes/Geo.Shape.md",
        "classes/Geo.Circle.md",
        "namespaces/Geo.md",
        "files/src.Geo.Shape.php.md",
        "files/src.Geo.Circle.php.md",
    ] {
        assert!(dir.path().join(page).exists(), "missing {}", page);
    }
}

#[test]
fn file_mode_resolves_inherited_docs() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let circle = read(&dir, "classes/Geo.Circle.md");
    assert!(circle.contains("<a id=\"method_area\"></a>"));
    assert!(circle.contains("public area(int|null $precision): float"));
    assert!(circle.contains("Area of the shape."));
    assert!(circle.contains("Rounded to the requested precision. Uses PI."));
    assert!(circle.contains("_Overrides [\\\\Geo\\\\Shape::area()](Geo.Shape.md#method_area)_"));
    // Defaults are never inherited.
    assert!(!circle.contains("$precision = 2"));
}

#[test]
fn file_mode_renders_argument_flags() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let circle = read(&dir, "classes/Geo.Circle.md");
    assert!(circle.contains("public scale(float &$factor, float ...$rest)"));
    assert!(circle.contains("private float $radius = 1.0"));
}

#[test]
fn file_mode_namespace_page() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let ns = read(&dir, "namespaces/Geo.md");
    assert!(ns.starts_with("# Namespace `\\Geo`\n"));
    assert!(ns.contains("<a id=\"function_circle\"></a>"));
    assert!(ns.contains("* [\\\\Geo\\\\Circle](../classes/Geo.Circle.md)"));
    assert!(ns.contains("PI = 3.14159"));
}

#[test]
fn file_mode_directory_input() {
    let dir = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    std::fs::copy(fixture_path("shapes.json"), input.path().join("shapes.json")).unwrap();
    std::fs::write(input.path().join("README.txt"), "not a manifest").unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(input.path().to_str().unwrap())
        .assert()
        .success();

    assert!(dir.path().join("classes/Geo.Circle.md").exists());
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("shapes.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn file_mode_skips_malformed_manifest() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("broken.json"))
        .arg(fixture_path("shapes.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping manifest"));

    assert!(dir.path().join("classes/Geo.Circle.md").exists());
}

#[test]
fn cyclic_hierarchy_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("cycle.json"))
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stderr(predicate::str::contains("inheritance cycle"));

    assert!(dir.path().join("classes/Loop.A.md").exists());
    assert!(dir.path().join("classes/Loop.B.md").exists());
}

// -- external links --

#[test]
fn external_links_point_off_site() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["--external", "Psr=https://psr.test/{FQSEN}"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let circle = read(&dir, "classes/Geo.Circle.md");
    assert!(circle.contains(
        "extends [\\\\Psr\\\\Container\\\\Base](https://psr.test/Psr/Container/Base)"
    ));
}

#[test]
fn undocumented_parent_without_external_link_is_plain_text() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let circle = read(&dir, "classes/Geo.Circle.md");
    assert!(circle.contains("extends `\\Psr\\Container\\Base`"));
}

#[test]
fn invalid_external_link_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["--external", "Psr"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected PREFIX=URL"));
}

// -- route mode --

#[test]
fn route_mode_prints_destinations() {
    cmd()
        .args(["-f", "html"])
        .args(["--route", "\\Geo\\Circle::area()"])
        .args(["--route", "\\Geo\\Circle"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\\Geo\\Circle::area()\tclasses/Geo.Circle.html#method_area",
        ))
        .stdout(predicate::str::contains("\\Geo\\Circle\tclasses/Geo.Circle.html"));
}

#[test]
fn route_mode_uses_format_extension() {
    cmd()
        .args(["--route", "\\Geo\\Circle"])
        .assert()
        .success()
        .stdout("\\Geo\\Circle\tclasses/Geo.Circle.md\n");
}

#[test]
fn route_mode_prefers_external() {
    cmd()
        .args(["--external", "Geo=https://geo.test/{FQSEN}.html"])
        .args(["--route", "\\Geo\\Circle"])
        .assert()
        .success()
        .stdout("\\Geo\\Circle\thttps://geo.test/Geo/Circle.html\n");
}

#[test]
fn route_mode_with_manifest_routes_namespaces() {
    cmd()
        .args(["--route", "\\Geo"])
        .args(["--route", "\\Geo\\PI"])
        .args(["--route", "\\Geo\\Circle"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success()
        .stdout(
            "\\Geo\tnamespaces/Geo.md\n\
             \\Geo\\PI\tnamespaces/Geo.md#constant_PI\n\
             \\Geo\\Circle\tclasses/Geo.Circle.md\n",
        );
}

#[test]
fn route_mode_single_router() {
    cmd()
        .args(["--external", "Geo=https://geo.test/{FQSEN}"])
        .args(["--router", "standard"])
        .args(["--route", "\\Geo\\Circle"])
        .assert()
        .success()
        .stdout("\\Geo\\Circle\tclasses/Geo.Circle.md\n");

    cmd()
        .args(["--router", "external"])
        .args(["--route", "\\Geo\\Circle"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("no router matched"));
}

#[test]
fn route_mode_rejects_unknown_router() {
    cmd()
        .args(["--router", "bogus"])
        .args(["--route", "\\Geo\\Circle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown router: bogus"));
}

// -- output formats --

#[test]
fn file_mode_html_format() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["-f", "html"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let output = read(&dir, "classes/Geo.Circle.html");
    assert!(output.contains("<!DOCTYPE html>"));
    assert!(output.contains("<h3 id=\"method_area\">area()</h3>"));
    assert!(dir.path().join("index.html").exists());
}

#[test]
fn file_mode_json_format() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["-f", "json"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success();

    let output = read(&dir, "classes/Geo.Circle.json");
    let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
    assert_eq!(parsed["fqsen"], "\\Geo\\Circle");
    assert_eq!(parsed["final"], true);
    assert_eq!(parsed["methods"][0]["arguments"][0]["types"][1], "null");
}

#[test]
fn invalid_format_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["-f", "xml"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

// -- logging --

#[test]
fn verbose_flag_enables_info_logs() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-v"])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("documentation written"));
}

#[test]
fn quiet_by_default() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("shapes.json"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
