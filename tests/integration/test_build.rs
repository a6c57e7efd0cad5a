use devx::core::client::{self, BuildRequest};
use devx::core::config::DevxConfig;
use devx::core::progress::RecordingProgress;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STACK: &str = r#"
stack:
  components:
    app:
      $dependencies: [db]
      $metadata:
        traits: [Service]
      $resources:
        app:
          driver: compose
          image: shop/app:1.4
          environment:
            DATABASE_HOST: {$ref: db.host}
    db:
      $metadata:
        traits: [Service]
        labels:
          role: database
      host: {$abstract: string}
      $resources:
        db:
          driver: compose
          image: postgres:16
"#;

const BUILDERS: &str = r#"
builders:
  dev:
    drivers:
      compose:
        name: shop-dev
        path: local
    additionalComponents:
      adminer:
        $metadata:
          traits: [Service]
        $resources:
          adminer:
            driver: compose
            image: adminer
    flows:
      - name: database
        match:
          labels:
            role: database
        pipeline:
          - defaults:
              host: db-dev
      - name: wire
        pipeline:
          - resolve: {}
  prod:
    flows:
      - match:
          labels:
            role: database
        pipeline:
          - defaults:
              host: db-prod
      - pipeline:
          - resolve: {}
"#;

fn write_project(dir: &Path) {
    fs::write(dir.join("stack.yaml"), STACK).unwrap();
    fs::write(dir.join("builders.yaml"), BUILDERS).unwrap();
}

fn request(dir: &Path, environment: &str) -> BuildRequest {
    BuildRequest {
        environment: environment.to_string(),
        config_dir: dir.to_path_buf(),
        config: DevxConfig::default(),
    }
}

fn read_yaml(path: &Path) -> Value {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn build_runs_flows_and_drivers_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    let mut progress = RecordingProgress::default();
    let summary = client::run(&request(temp_dir.path(), "dev"), &mut progress).unwrap();

    assert_eq!(summary.environment, "dev");
    assert_eq!(summary.components, vec!["db", "app", "adminer"]);
    assert_eq!(progress.total, Some(6));
    assert_eq!(progress.advanced(), 6);

    let compose_file = temp_dir
        .path()
        .join("build")
        .join("local")
        .join("docker-compose.yml");
    assert_eq!(summary.files().collect::<Vec<_>>(), vec![&compose_file]);

    let written = read_yaml(&compose_file);
    assert_eq!(written["name"], "shop-dev");
    assert_eq!(written["services"]["db"]["image"], "postgres:16");
    assert_eq!(
        written["services"]["app"]["environment"]["DATABASE_HOST"],
        "db-dev"
    );
    assert_eq!(written["services"]["adminer"]["image"], "adminer");
    assert!(written["services"]["app"].get("driver").is_none());
}

#[test]
fn environments_share_the_stack_but_not_their_results() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    let summary =
        client::run(&request(temp_dir.path(), "prod"), &mut RecordingProgress::default()).unwrap();

    assert_eq!(summary.components, vec!["db", "app"]);
    let written = read_yaml(
        &temp_dir
            .path()
            .join("build")
            .join("compose")
            .join("docker-compose.yml"),
    );
    assert!(written.get("name").is_none());
    assert_eq!(
        written["services"]["app"]["environment"]["DATABASE_HOST"],
        "db-prod"
    );
    assert!(written["services"].get("adminer").is_none());
}

#[test]
fn output_dir_override_is_honoured() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());
    let mut request = request(temp_dir.path(), "prod");
    request.config.output.dir = out_dir.path().to_path_buf();

    client::run(&request, &mut RecordingProgress::default()).unwrap();

    assert!(out_dir
        .path()
        .join("compose")
        .join("docker-compose.yml")
        .exists());
    assert!(!temp_dir.path().join("build").exists());
}

#[test]
fn unknown_environment_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    let err = client::run(&request(temp_dir.path(), "qa"), &mut RecordingProgress::default())
        .unwrap_err();

    assert_eq!(err.code, "ENV-NOT-FOUND-001");
    assert_eq!(err.message, "environment qa was not found");
    assert!(err.recovery_suggestions[0].contains("dev, prod"));
}

#[test]
fn failed_transformation_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("stack.yaml"), STACK).unwrap();
    fs::write(
        temp_dir.path().join("builders.yaml"),
        "builders:\n  bare:\n    flows:\n      - pipeline:\n          - resolve: {}\n",
    )
    .unwrap();

    let err = client::run(&request(temp_dir.path(), "bare"), &mut RecordingProgress::default())
        .unwrap_err();

    assert_eq!(err.code, "TRANSFORM-CONCRETE-001");
    assert!(err.message.contains("component db"));
    assert!(err.message.contains("stack.components.db.host: incomplete value string"));
    assert!(!temp_dir.path().join("build").exists());
}

const SINGLE_SERVICE_STACK: &str = r#"
stack:
  components:
    web:
      $metadata:
        labels:
          role: web
      $resources:
        web:
          driver: compose
          image: nginx
    cache:
      $resources:
        cache:
          driver: compose
          image: redis:7
"#;

fn write_single_service_project(dir: &Path, flows: &str) {
    fs::write(dir.join("stack.yaml"), SINGLE_SERVICE_STACK).unwrap();
    fs::write(
        dir.join("builders.yaml"),
        format!("builders:\n  dev:\n    flows:\n{}", flows),
    )
    .unwrap();
}

#[test]
fn summary_reports_the_order_that_was_transformed() {
    let temp_dir = TempDir::new().unwrap();
    write_single_service_project(
        temp_dir.path(),
        "      - match:\n          labels:\n            role: web\n        pipeline:\n          - patch:\n              $dependencies: [cache]\n",
    );

    let summary =
        client::run(&request(temp_dir.path(), "dev"), &mut RecordingProgress::default()).unwrap();

    assert_eq!(summary.components, vec!["web", "cache"]);
}

#[test]
fn dependencies_added_by_flows_do_not_fail_a_finished_build() {
    let temp_dir = TempDir::new().unwrap();
    write_single_service_project(
        temp_dir.path(),
        "      - pipeline:\n          - patch:\n              $dependencies: [ghost]\n",
    );

    let summary =
        client::run(&request(temp_dir.path(), "dev"), &mut RecordingProgress::default()).unwrap();

    assert_eq!(summary.components, vec!["web", "cache"]);
    let compose_file = temp_dir
        .path()
        .join("build")
        .join("compose")
        .join("docker-compose.yml");
    assert_eq!(summary.files().collect::<Vec<_>>(), vec![&compose_file]);
    assert_eq!(read_yaml(&compose_file)["services"]["web"]["image"], "nginx");
}

#[test]
fn list_environments_reports_flows_and_drivers() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    let environments =
        client::list_environments(temp_dir.path(), &DevxConfig::default()).unwrap();

    assert_eq!(environments.len(), 2);
    assert_eq!(environments[0].name, "dev");
    assert_eq!(environments[0].flows, 2);
    assert_eq!(environments[0].drivers, vec!["compose"]);
    assert_eq!(environments[1].name, "prod");
    assert!(environments[1].drivers.is_empty());
}

#[test]
fn cli_build_prints_summary() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("devx"))
        .arg("build")
        .arg("prod")
        .arg("--config-dir")
        .arg(temp_dir.path())
        .arg("--no-progress")
        .env("RUST_LOG", "off")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Transforming stack for the prod environment...",
        ))
        .stdout(predicate::str::contains("Built 2 components for prod: db, app"))
        .stdout(predicate::str::contains("docker-compose.yml"));
}

#[test]
fn cli_build_fails_for_unknown_environment() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("devx"))
        .args(["build", "qa", "--no-progress", "--config-dir"])
        .arg(temp_dir.path())
        .env("RUST_LOG", "off")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ENV-NOT-FOUND-001"))
        .stderr(predicate::str::contains("environment qa was not found"));
}

#[test]
fn cli_environments_lists_names() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("devx"))
        .arg("environments")
        .arg("--config-dir")
        .arg(temp_dir.path())
        .env("RUST_LOG", "off")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev\tflows: 2\tdrivers: compose"))
        .stdout(predicate::str::contains("prod\tflows: 2\tdrivers: -"));
}
