#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REGISTRY: &str = r#"
version: 1
entities:
  scripts:
    script-validate-01:
      path: scripts/validate-story.js
      category: validation
      description: validates story draft markdown against schema
      used_by: [task-create-story]
  tasks:
    task-create-story:
      path: tasks/create-story.md
      category: authoring
      description: create a story from the story template
  utils:
    template-engine:
      path: utils/template-engine.js
      category: rendering
      description: render handlebars templates
      used_by: [task-create-story]
"#;

fn ids(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ids").unwrap();
    cmd.current_dir(dir.path()).env("IDS_ROOT", dir.path());
    cmd
}

fn project(registry: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".ids")).unwrap();
    std::fs::write(dir.path().join(".ids/registry.yaml"), registry).unwrap();
    dir
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// ids query
// ---------------------------------------------------------------------------

#[test]
fn query_reuse_json() {
    let dir = project(REGISTRY);
    let json = json_output(ids(&dir).args(["query", "validate", "story", "drafts", "--json"]));

    assert_eq!(json["summary"]["decision"], "REUSE");
    assert_eq!(json["summary"]["totalEntities"], 3);
    assert_eq!(json["recommendations"][0]["entityId"], "script-validate-01");
    assert_eq!(json["recommendations"][0]["decision"], "REUSE");
    assert!(json.get("justification").is_none());
    assert!(!dir.path().join(".ids/create-justifications.yaml").exists());
}

#[test]
fn query_alias_and_human_output() {
    let dir = project(REGISTRY);
    ids(&dir)
        .args(["ids:query", "validate story drafts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision: REUSE (high confidence)"))
        .stdout(predicate::str::contains("script-validate-01"))
        .stdout(predicate::str::contains("Relevance: 100.0%"));
}

#[test]
fn query_adapt_reports_impact() {
    let dir = project(REGISTRY);
    ids(&dir)
        .args(["query", "render handlebars email templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADAPT"))
        .stdout(predicate::str::contains("Impact: 1 direct, 0 indirect consumers"));
}

#[test]
fn query_create_records_justification() {
    let dir = project(REGISTRY);
    let json = json_output(ids(&dir).args(["query", "deploy kubernetes cluster", "--json"]));

    assert_eq!(json["summary"]["decision"], "CREATE");
    let evaluated = json["justification"]["evaluatedPatterns"].as_array().unwrap();
    assert_eq!(evaluated.len(), 3);
    assert!(json["justification"]["rejectionReasons"]["script-validate-01"]
        .as_str()
        .unwrap()
        .contains("below"));

    let log = std::fs::read_to_string(dir.path().join(".ids/create-justifications.yaml")).unwrap();
    assert!(log.contains("entityId: deploy-kubernetes-cluster"));

    // repeating the query does not duplicate the record
    ids(&dir)
        .args(["query", "deploy kubernetes cluster"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE justification:"));
    let log = std::fs::read_to_string(dir.path().join(".ids/create-justifications.yaml")).unwrap();
    assert_eq!(log.matches("entityId: deploy-kubernetes-cluster").count(), 1);
}

#[test]
fn query_type_filter() {
    let dir = project(REGISTRY);
    let json = json_output(ids(&dir).args([
        "query",
        "validate story drafts",
        "--type",
        "task",
        "--json",
    ]));
    for rec in json["recommendations"].as_array().unwrap() {
        assert_eq!(rec["entityType"], "task");
    }
}

#[test]
fn query_category_filter_excluding_everything_warns() {
    let dir = project(REGISTRY);
    let json = json_output(ids(&dir).args([
        "query",
        "validate story drafts",
        "--category",
        "nope",
        "--json",
    ]));
    assert_eq!(json["summary"]["decision"], "CREATE");
    assert!(json["warnings"][0]
        .as_str()
        .unwrap()
        .contains("filter excluded all entities"));
}

#[test]
fn query_rejects_unknown_type() {
    let dir = project(REGISTRY);
    ids(&dir)
        .args(["query", "anything", "--type", "widget"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid entity type 'widget'"));
}

#[test]
fn query_rejects_blank_intent() {
    let dir = project(REGISTRY);
    ids(&dir)
        .args(["query", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("intent is required"));
}

#[test]
fn query_without_registry_fails() {
    let dir = TempDir::new().unwrap();
    ids(&dir)
        .args(["query", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load registry"))
        .stderr(predicate::str::contains("registry not found"));
}

#[test]
fn query_with_duplicate_ids_fails() {
    let dir = project(
        "entities:\n  scripts:\n    dup:\n      path: a.js\n  tasks:\n    dup:\n      path: b.md\n",
    );
    ids(&dir)
        .args(["query", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate entity id: dup"));
}

#[test]
fn query_with_invalid_config_fails() {
    let dir = project(REGISTRY);
    std::fs::write(
        dir.path().join(".ids/config.yaml"),
        "thresholds:\n  adapt: 0.95\n",
    )
    .unwrap();
    ids(&dir)
        .args(["query", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn query_with_oversized_review_horizon_fails() {
    let dir = project(REGISTRY);
    std::fs::write(
        dir.path().join(".ids/config.yaml"),
        "review:\n  horizon_days: 1000000000\n",
    )
    .unwrap();
    ids(&dir)
        .args(["query", "deploy kubernetes cluster"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid config"))
        .stderr(predicate::str::contains("review.horizon_days=1000000000"));
}

#[test]
fn query_on_empty_registry() {
    let dir = project("version: 1\nentities: {}\n");
    let json = json_output(ids(&dir).args(["query", "anything", "--json"]));
    assert_eq!(json["summary"]["totalEntities"], 0);
    assert_eq!(json["summary"]["matchesFound"], 0);
    assert_eq!(json["summary"]["decision"], "CREATE");
    assert!(json["warnings"][0]
        .as_str()
        .unwrap()
        .contains("registry is empty"));
}

// ---------------------------------------------------------------------------
// ids create-review
// ---------------------------------------------------------------------------

#[test]
fn create_review_with_no_justifications() {
    let dir = project(REGISTRY);
    ids(&dir)
        .arg("create-review")
        .assert()
        .success()
        .stdout(predicate::str::contains("No CREATE justifications recorded yet."));

    let json = json_output(ids(&dir).args(["ids:create-review", "--json"]));
    assert_eq!(json["totalReviewed"], 0);
}

#[test]
fn create_review_buckets_recorded_decisions() {
    let dir = project(REGISTRY);
    std::fs::write(
        dir.path().join(".ids/create-justifications.yaml"),
        r#"
- entityId: old-unused
  intent: old unused thing
  decidedAt: 2020-01-01T00:00:00Z
  justification:
    evaluatedPatterns: []
    rejectionReasons: {}
    newCapability: old unused thing
    reviewScheduled: 2020-01-31T00:00:00Z
- entityId: popular
  intent: popular thing
  decidedAt: 2099-01-01T00:00:00Z
  justification:
    evaluatedPatterns: []
    rejectionReasons: {}
    newCapability: popular thing
    reviewScheduled: 2099-01-31T00:00:00Z
  reusageCount: 5
- entityId: fresh
  intent: fresh thing
  decidedAt: 2099-01-01T00:00:00Z
  justification:
    evaluatedPatterns: []
    rejectionReasons: {}
    newCapability: fresh thing
    reviewScheduled: 2099-01-31T00:00:00Z
- entityId: lukewarm
  intent: lukewarm thing
  decidedAt: 2020-01-01T00:00:00Z
  justification:
    evaluatedPatterns: []
    rejectionReasons: {}
    newCapability: lukewarm thing
    reviewScheduled: 2020-01-31T00:00:00Z
  reusageCount: 1
"#,
    )
    .unwrap();

    let json = json_output(ids(&dir).args(["create-review", "--json"]));
    assert_eq!(json["totalReviewed"], 4);
    assert_eq!(json["deprecationReview"][0]["entityId"], "old-unused");
    assert_eq!(json["promotionCandidates"][0]["entityId"], "popular");
    assert_eq!(json["pendingReview"][0]["entityId"], "fresh");
    assert_eq!(json["monitoring"][0]["entityId"], "lukewarm");

    ids(&dir)
        .arg("create-review")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deprecation review (1):"))
        .stdout(predicate::str::contains("popular - reused 5x"));
}

#[test]
fn query_then_review_shows_pending() {
    let dir = project(REGISTRY);
    ids(&dir)
        .args(["query", "deploy kubernetes cluster"])
        .assert()
        .success();
    let json = json_output(ids(&dir).args(["create-review", "--json"]));
    assert_eq!(json["totalReviewed"], 1);
    assert_eq!(json["pendingReview"][0]["entityId"], "deploy-kubernetes-cluster");
    assert_eq!(json["pendingReview"][0]["status"], "pending-review");
}
