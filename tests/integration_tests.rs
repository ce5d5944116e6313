//! Integration tests for the academy CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. HTTP
//! services are stood in for by wiremock servers.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to get an academy command isolated from the user's config
fn academy(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("academy").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("ACADEMY_BASE_URL")
        .env_remove("ACADEMY_STATE_API_KEY")
        .env_remove("ACADEMY_COUNTRY_API_URL")
        .env_remove("ACADEMY_STATE_API_URL")
        .env_remove("ACADEMY_LOG");
    cmd
}

/// Course flags that pass validation
fn valid_course_args() -> Vec<&'static str> {
    vec![
        "--name",
        "Rust 101",
        "--start-date",
        "2025-01-13",
        "--duration",
        "2 months",
        "--cohort",
        "January(2025)",
        "--resource-link",
        "https://example.com/resources",
        "--community-link",
        "https://chat.whatsapp.com/abc",
        "--platform-name",
        "Discord",
        "--platform-link",
        "https://discord.gg/rust",
        "--usd",
        "500",
        "--ngn",
        "350000",
        "--recurrent-usd",
        "300",
        "--recurrent-ngn",
        "200000",
        "--frequency",
        "3",
    ]
}

/// Registration flags that pass validation, apart from country and state
fn valid_registration_args() -> Vec<&'static str> {
    vec![
        "--full-name",
        "Ada Obi",
        "--email",
        "ada@example.com",
        "--phone",
        "+2348012345678",
        "--age-range",
        "25-34",
        "--course",
        "Product Design",
        "--cohort",
        "April 2025",
        "--referral-source",
        "Social Media",
        "--payment-plan",
        "Installments",
        "--payment-method",
        "Card",
    ]
}

fn write_draft(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let file = dir.join(name);
    fs::write(&file, content).unwrap();
    file
}

const VALID_COURSE_DRAFT: &str = r#"
name: "Rust 101"
startDate: "2025-01-13"
duration: "2 months"
cohort: "January(2025)"
links:
  resourceLink: "https://example.com/resources"
  communityLink: "https://chat.whatsapp.com/abc"
  platformName: "Discord"
  platformLink: "https://discord.gg/rust"
price:
  USD: 500
  NGN: 350000
recurrentPrice:
  USD: 300
  NGN: 200000
  frequency: 2
"#;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("course"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("countries"));
}

#[test]
fn test_version_displays() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("academy"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("academy"));
}

// ============================================================================
// Course Tests
// ============================================================================

#[test]
fn test_course_draft_lists_frequency_labels() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["course", "draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recurrentPrice:"))
        .stdout(predicate::str::contains("frequency: 2"))
        .stdout(predicate::str::contains("2 = Twice"));
}

#[test]
fn test_course_draft_to_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("course.yaml");
    academy(&home)
        .args(["course", "draft", "-o"])
        .arg(&out)
        .assert()
        .success();

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("links:"));
}

#[test]
fn test_course_dry_run_valid() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["course", "new", "--dry-run"])
        .args(valid_course_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn test_course_defaults_rejected_with_every_message() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["course", "new", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name: Course name is required"))
        .stderr(predicate::str::contains("links.resourceLink: Invalid resource link"))
        .stderr(predicate::str::contains("recurrentPrice.NGN: Recurrent NGN price is required"))
        .stderr(predicate::str::contains("12 fields are invalid"));
}

#[test]
fn test_course_frequency_out_of_range() {
    let home = TempDir::new().unwrap();
    let mut args = valid_course_args();
    let last = args.len() - 1;
    args[last] = "5";

    academy(&home)
        .args(["course", "new", "--dry-run"])
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Frequency must be between 1 and 4"));
}

#[test]
fn test_course_frequency_must_be_number() {
    let home = TempDir::new().unwrap();
    let mut args = valid_course_args();
    let last = args.len() - 1;
    args[last] = "twice";

    academy(&home)
        .args(["course", "new", "--dry-run"])
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("a whole number"));
}

#[test]
fn test_course_new_needs_base_url() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["course", "new"])
        .args(valid_course_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url is not configured"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_course_posted_to_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/course"))
        .and(body_partial_json(json!({
            "name": "Rust 101",
            "links": { "platformName": "Discord" },
            "price": { "USD": "500", "NGN": "350000" },
            "recurrentPrice": { "frequency": 3 }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    academy(&home)
        .env("ACADEMY_BASE_URL", server.uri())
        .args(["course", "new"])
        .args(valid_course_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("New Course Added Successfully!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_course_base_url_flag_overrides_env() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/course"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    academy(&home)
        .env("ACADEMY_BASE_URL", "http://127.0.0.1:9")
        .args(["course", "new", "--base-url"])
        .arg(format!("{}/api/", server.uri()))
        .args(valid_course_args())
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_course_server_error_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/course"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    academy(&home)
        .env("ACADEMY_BASE_URL", server.uri())
        .args(["course", "new"])
        .args(valid_course_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to add course: request failed with status code 500",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_course_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    academy(&home)
        .env("ACADEMY_BASE_URL", server.uri())
        .args(["course", "new", "--name", "Rust 101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("startDate: Start date is required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_course_from_draft_coerces_prices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/course"))
        .and(body_partial_json(json!({
            "name": "Rust 102",
            "price": { "USD": "500" },
            "recurrentPrice": { "frequency": 2 }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let draft = write_draft(home.path(), "course.yaml", VALID_COURSE_DRAFT);

    // Flags override values from the draft
    academy(&home)
        .env("ACADEMY_BASE_URL", server.uri())
        .args(["course", "new", "--name", "Rust 102", "--from"])
        .arg(&draft)
        .assert()
        .success();
}

#[test]
fn test_course_dry_run_json_output() {
    let home = TempDir::new().unwrap();
    let output = academy(&home)
        .args(["--format", "json", "course", "new", "--dry-run"])
        .args(valid_course_args())
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["recurrentPrice"]["frequency"], 3);
    assert_eq!(value["links"]["platformName"], "Discord");
}

// ============================================================================
// Registration Tests
// ============================================================================

async fn mount_location_services(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3.1/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": { "common": "Nigeria" }, "cca2": "NG" },
            { "name": { "common": "Ghana" }, "cca2": "GH" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/countries/NG/states"))
        .and(header("X-CSCAPI-KEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Lagos", "iso2": "LA" },
            { "name": "Oyo", "iso2": "OY" }
        ])))
        .mount(server)
        .await;
}

fn with_location_env(cmd: &mut Command, server: &MockServer) {
    cmd.env(
        "ACADEMY_COUNTRY_API_URL",
        format!("{}/v3.1/all?fields=name,cca2", server.uri()),
    )
    .env("ACADEMY_STATE_API_URL", format!("{}/v1", server.uri()))
    .env("ACADEMY_STATE_API_KEY", "test-key");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_with_country_and_state() {
    let server = MockServer::start().await;
    mount_location_services(&server).await;

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    cmd.args(["register", "new", "--country", "ng", "--state", "Lagos"])
        .args(valid_registration_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("Registration received!"))
        .stderr(predicate::str::contains("registration received"))
        .stderr(predicate::str::contains("ada@example.com"))
        .stderr(predicate::str::contains("Lagos"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_choices_match_any_case() {
    let server = MockServer::start().await;
    mount_location_services(&server).await;

    let args: Vec<&str> = valid_registration_args()
        .into_iter()
        .map(|arg| match arg {
            "Card" => "ussd",
            "Product Design" => "product design",
            other => other,
        })
        .collect();

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    let output = cmd
        .args(["--format", "json", "register", "new", "--dry-run"])
        .args(["--country", "Nigeria", "--state", "lagos"])
        .args(args)
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["paymentMethod"], "USSD");
    assert_eq!(value["course"], "Product Design");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_unknown_state_refused() {
    let server = MockServer::start().await;
    mount_location_services(&server).await;

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    cmd.args(["register", "new", "--country", "Nigeria", "--state", "Accra"])
        .args(valid_registration_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("'Accra' is not a state of Nigeria"));
}

#[test]
fn test_register_state_requires_country() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["register", "new", "--state", "Lagos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--country"));
}

#[test]
fn test_register_missing_location_rejected() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["register", "new", "--dry-run"])
        .args(valid_registration_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("country: Country is required"))
        .stderr(predicate::str::contains("state: State is required"));
}

#[test]
fn test_register_bad_choices_rejected() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args([
            "register",
            "new",
            "--dry-run",
            "--email",
            "not-an-email",
            "--course",
            "Basket Weaving",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email: Invalid email address"))
        .stderr(predicate::str::contains("course: Please select a course"));
}

// ============================================================================
// Remote List Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_countries_tsv() {
    let server = MockServer::start().await;
    mount_location_services(&server).await;

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    cmd.args(["countries", "--format", "tsv"])
        .assert()
        .success()
        .stdout("GH\tGhana\nNG\tNigeria\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_countries_search() {
    let server = MockServer::start().await;
    mount_location_services(&server).await;

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    cmd.args(["countries", "--search", "nig", "--format", "id"])
        .assert()
        .success()
        .stdout("NG\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_states_csv() {
    let server = MockServer::start().await;
    mount_location_services(&server).await;

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    cmd.args(["states", "ng", "--format", "csv"])
        .assert()
        .success()
        .stdout("code,name\nLA,Lagos\nOY,Oyo\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_countries_service_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = academy(&home);
    with_location_env(&mut cmd, &server);
    cmd.arg("countries")
        .assert()
        .failure()
        .stderr(predicate::str::contains("status code 503"));
}

#[test]
fn test_states_need_api_key() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["states", "NG"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("state_api_key is not configured"));
}

// ============================================================================
// Validate / Schema Tests
// ============================================================================

#[test]
fn test_validate_valid_draft() {
    let home = TempDir::new().unwrap();
    let draft = write_draft(home.path(), "course.yaml", VALID_COURSE_DRAFT);

    academy(&home)
        .args(["validate", "--form", "course"])
        .arg(&draft)
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed validation!"));
}

#[test]
fn test_validate_invalid_draft() {
    let home = TempDir::new().unwrap();
    let content = VALID_COURSE_DRAFT.replace("https://example.com/resources", "not a link");
    write_draft(home.path(), "bad.yaml", &content);
    write_draft(home.path(), "good.yaml", VALID_COURSE_DRAFT);

    academy(&home)
        .args(["validate", "--keep-going", "--form", "course"])
        .arg(home.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid resource link"))
        .stdout(predicate::str::contains("Files passed:"))
        .stderr(predicate::str::contains("Validation failed: 1 file has errors"));
}

#[test]
fn test_validate_yaml_syntax_error() {
    let home = TempDir::new().unwrap();
    let draft = write_draft(home.path(), "broken.yaml", "name: [unclosed\n");

    academy(&home)
        .args(["validate", "--form", "course"])
        .arg(&draft)
        .assert()
        .failure();
}

#[test]
fn test_schema_summary() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["schema", "course"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recurrentPrice.frequency"))
        .stdout(predicate::str::contains("Four times"));
}

#[test]
fn test_schema_raw_is_json() {
    let home = TempDir::new().unwrap();
    let output = academy(&home)
        .args(["schema", "registration", "--raw"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"]["paymentMethod"]["enum"].is_array());
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_show_unset() {
    let home = TempDir::new().unwrap();

    academy(&home)
        .args(["config", "set", "base_url", "https://api.example.com"])
        .assert()
        .success();

    academy(&home)
        .args(["config", "show", "base_url"])
        .assert()
        .success()
        .stdout("https://api.example.com\n");

    academy(&home)
        .args(["config", "unset", "base_url"])
        .assert()
        .success();

    academy(&home)
        .args(["config", "show", "base_url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[test]
fn test_config_env_overrides_file() {
    let home = TempDir::new().unwrap();
    let file = write_draft(home.path(), "academy.yaml", "base_url: https://file.example.com\n");

    academy(&home)
        .env("ACADEMY_BASE_URL", "https://env.example.com")
        .args(["--config"])
        .arg(&file)
        .args(["config", "show", "base_url"])
        .assert()
        .success()
        .stdout("https://env.example.com\n");
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_show_masks_api_key() {
    let home = TempDir::new().unwrap();
    academy(&home)
        .env("ACADEMY_STATE_API_KEY", "secret-key-1234")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234"))
        .stdout(predicate::str::contains("secret").not());

    for format in ["json", "yaml"] {
        academy(&home)
            .env("ACADEMY_STATE_API_KEY", "secret-key-1234")
            .args(["config", "show", "--format", format])
            .assert()
            .success()
            .stdout(predicate::str::contains("***********1234"))
            .stdout(predicate::str::contains("secret").not());
    }
}
