use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Mock, Server, ServerGuard};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Fixture {
    dir: TempDir,
    site: PathBuf,
}

impl Fixture {
    fn new(index_url: &str) -> Self {
        let dir = tempdir().unwrap();
        let site = dir.path().join("site-packages");
        fs::create_dir_all(&site).unwrap();

        let config = format!(
            r#"{{
                "index_url": "{}/pypi",
                "max_retries": 1,
                "retry_delay_ms": 1,
                "site_packages": ["{}"],
                "environment": {{
                    "python_version": "3.11",
                    "python_full_version": "3.11.4",
                    "sys_platform": "linux",
                    "os_name": "posix"
                }}
            }}"#,
            index_url,
            site.display()
        );
        fs::write(dir.path().join("config.json"), config).unwrap();

        Self { dir, site }
    }

    fn install(&self, name: &str, version: &str, requires: &[&str]) {
        let dist_info = self.site.join(format!("{}-{}.dist-info", name, version));
        fs::create_dir_all(&dist_info).unwrap();

        let mut metadata = format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n", name, version);
        for req in requires {
            metadata.push_str(&format!("Requires-Dist: {}\n", req));
        }
        fs::write(dist_info.join("METADATA"), metadata).unwrap();
    }

    fn uninstall(&self, name: &str, version: &str) {
        fs::remove_dir_all(self.site.join(format!("{}-{}.dist-info", name, version))).unwrap();
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo::cargo_bin!("pkgmon"));
        cmd.arg("--config")
            .arg(self.dir.path().join("config.json"))
            .arg("--state")
            .arg(self.state_path());
        cmd
    }

    fn state(&self) -> serde_json::Value {
        read_json(&self.state_path())
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn mock_project(server: &mut ServerGuard, name: &str, body: &str) -> Mock {
    server
        .mock("GET", format!("/pypi/{}/json", name).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

fn mock_index(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        mock_project(
            server,
            "Django",
            r#"{
                "info": {"project_url": "https://www.djangoproject.com/"},
                "releases": {
                    "4.2.1": [{"yanked": false, "requires_python": ">=3.8"}],
                    "4.2.7": [{"yanked": false, "requires_python": ">=3.8"}],
                    "5.0a1": [{"yanked": false, "requires_python": ">=3.10"}]
                }
            }"#,
        ),
        mock_project(
            server,
            "asgiref",
            r#"{
                "info": {"project_url": null},
                "releases": {
                    "3.6.0": [{"yanked": false}],
                    "3.7.2": [{"yanked": false}],
                    "4.0.0": [{"yanked": false}]
                }
            }"#,
        ),
        mock_project(
            server,
            "requests",
            r#"{
                "info": null,
                "releases": {
                    "2.28.0": [{"yanked": false, "requires_python": ">=3.7"}],
                    "2.30.0": [{"yanked": false, "requires_python": ">=3.7"}],
                    "2.31.0": [{"yanked": true, "requires_python": ">=3.7"}],
                    "2.32.0": [{"yanked": false, "requires_python": ">=3.12"}]
                }
            }"#,
        ),
        server
            .mock("GET", "/pypi/private-pkg/json")
            .with_status(404)
            .create(),
        server
            .mock("GET", "/pypi/flaky/json")
            .with_status(500)
            .create(),
    ]
}

fn install_all(fixture: &Fixture) {
    fixture.install("Django", "4.2.1", &["asgiref (<4,>=3.6.0)", "sqlparse>=0.3.1"]);
    fixture.install("asgiref", "3.6.0", &[r#"typing-extensions>=4; python_version < "3.11""#]);
    fixture.install("requests", "2.28.0", &[]);
    fixture.install("private-pkg", "1.0", &[]);
    fixture.install("flaky", "1.0", &[]);
}

#[test]
fn test_refresh_stores_latest_versions() {
    let mut server = Server::new();
    let _mocks = mock_index(&mut server);
    let fixture = Fixture::new(&server.url());
    install_all(&fixture);

    fixture
        .cmd()
        .arg("refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("Refreshed 5 packages (3 outdated)"));

    let state = fixture.state();
    let dists = &state["distributions"];

    assert_eq!(dists["django"]["latest_version"], "4.2.7");
    assert_eq!(dists["django"]["is_outdated"], true);
    assert_eq!(dists["django"]["website_url"], "https://www.djangoproject.com/");

    // Constrained by Django's requirement
    assert_eq!(dists["asgiref"]["latest_version"], "3.7.2");
    assert_eq!(dists["asgiref"]["used_by"][0]["name"], "Django");
    assert_eq!(
        dists["asgiref"]["used_by"][0]["requirements"],
        serde_json::json!(["<4", ">=3.6.0"])
    );

    // Yanked and Python-incompatible releases are skipped
    assert_eq!(dists["requests"]["latest_version"], "2.30.0");

    for name in ["private-pkg", "flaky"] {
        assert_eq!(dists[name]["latest_version"], "");
        assert!(dists[name]["is_outdated"].is_null());
    }
}

#[test]
fn test_refresh_sequential_matches_concurrent() {
    let mut server = Server::new();
    let _mocks = mock_index(&mut server);
    let fixture = Fixture::new(&server.url());
    install_all(&fixture);

    fixture.cmd().arg("refresh").assert().success();
    let mut concurrent = fixture.state();

    fixture.cmd().arg("refresh").arg("--sequential").assert().success();
    let mut sequential = fixture.state();

    for state in [&mut concurrent, &mut sequential] {
        for (_, dist) in state["distributions"].as_object_mut().unwrap() {
            dist.as_object_mut().unwrap().remove("updated_at");
        }
    }
    assert_eq!(concurrent, sequential);
}

#[test]
fn test_refresh_removes_uninstalled_packages() {
    let mut server = Server::new();
    let _mocks = mock_index(&mut server);
    let fixture = Fixture::new(&server.url());
    install_all(&fixture);

    fixture.cmd().arg("refresh").assert().success();
    assert!(fixture.state()["distributions"]["requests"].is_object());

    fixture.uninstall("requests", "2.28.0");
    fixture.cmd().arg("refresh").assert().success();

    let state = fixture.state();
    assert!(state["distributions"].get("requests").is_none());
    assert_eq!(state["distributions"].as_object().unwrap().len(), 4);
}

#[test]
fn test_list_and_install_command() {
    let mut server = Server::new();
    let _mocks = mock_index(&mut server);
    let fixture = Fixture::new(&server.url());
    install_all(&fixture);

    fixture.cmd().arg("refresh").assert().success();

    fixture
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Django"))
        .stdout(predicate::str::contains("outdated"))
        .stdout(predicate::str::contains("3 of 5 packages outdated"));

    fixture
        .cmd()
        .arg("list")
        .arg("--outdated")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"requests\""))
        .stdout(predicate::str::contains("\"flaky\"").not());

    fixture
        .cmd()
        .arg("install-command")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "pip install asgiref==3.7.2 Django==4.2.7 requests==2.30.0\n",
        ));
}

#[test]
fn test_notify_once_per_version() {
    let mut server = Server::new();
    let _mocks = mock_index(&mut server);
    let fixture = Fixture::new(&server.url());
    install_all(&fixture);

    fixture.cmd().arg("refresh").assert().success();

    fixture
        .cmd()
        .arg("notify")
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available: Django 4.2.7"))
        .stdout(predicate::str::contains(
            "There is an update available: Django 4.2.1 => 4.2.7",
        ));

    fixture
        .cmd()
        .arg("notify")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new updates."));

    fixture
        .cmd()
        .arg("notify")
        .arg("--repeat")
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available: Django 4.2.7"));

    // A later refresh keeps what was notified
    fixture.cmd().arg("refresh").assert().success();
    assert_eq!(
        fixture.state()["distributions"]["django"]["latest_notified_version"],
        "4.2.7"
    );
}

#[test]
fn test_refresh_with_missing_site_packages_succeeds_empty() {
    let server = Server::new();
    let fixture = Fixture::new(&server.url());
    fs::remove_dir_all(&fixture.site).unwrap();

    fixture
        .cmd()
        .arg("refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("Refreshed 0 packages"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempdir().unwrap();

    Command::new(cargo::cargo_bin!("pkgmon"))
        .arg("--config")
        .arg(dir.path().join("nope.json"))
        .arg("--state")
        .arg(dir.path().join("state.json"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}
