use chrono::Utc;
use sk_protocol::*;
use std::path::PathBuf;
use uuid::Uuid;

fn sample_run() -> Run {
    Run {
        id: Uuid::new_v4(),
        pipeline_name: "release".to_string(),
        status: RunStatus::Interrupted,
        result: Some(RunResult::Aborted),
        current_step: 3,
        logs: vec!["Running step: deploy".to_string(), "Aborted by alice".to_string()],
        actions: vec![RunAction::Interrupted(InterruptedRunAction {
            signal_id: Uuid::new_v4(),
            result: RunResult::Aborted,
            causes: vec![
                CauseEntry {
                    kind: "sk_protocol::cause_models::CauseOfInterruption".to_string(),
                    description: "Aborted by alice".to_string(),
                    cause: Some(CauseOfInterruption::user("alice")),
                },
                CauseEntry {
                    kind: "sk_core::interrupt::cause::ErrorCause".to_string(),
                    description: "Interrupted by error: lease lost".to_string(),
                    cause: None,
                },
            ],
            recorded_at: Utc::now(),
        })],
    }
}

#[test]
fn test_run_roundtrip_preserves_actions() {
    let run = sample_run();

    let json = serde_json::to_string(&run).expect("Failed to serialize Run");
    let back: Run = serde_json::from_str(&json).expect("Failed to deserialize Run");

    assert_eq!(back.id, run.id);
    assert_eq!(back.status, RunStatus::Interrupted);
    assert_eq!(back.result, Some(RunResult::Aborted));
    assert_eq!(back.logs, run.logs);
    assert_eq!(back.actions, run.actions);
}

#[test]
fn test_run_action_wire_shape() {
    let run = sample_run();
    let json = serde_json::to_value(&run).expect("Failed to serialize Run");

    let action = &json["actions"][0];
    assert_eq!(action["type"], "interrupted");
    assert_eq!(action["payload"]["result"], "ABORTED");
    assert_eq!(
        action["payload"]["causes"][0]["cause"]["type"],
        "userInterruption"
    );
    assert!(action["payload"]["causes"][1].get("cause").is_none());
}

#[test]
fn test_run_defaults_for_missing_fields() {
    let json = serde_json::json!({
        "id": Uuid::new_v4(),
        "pipeline_name": "release",
        "status": "PENDING",
        "current_step": 0
    });

    let run: Run = serde_json::from_value(json).expect("Failed to deserialize Run");

    assert_eq!(run.status, RunStatus::Pending);
    assert!(run.result.is_none());
    assert!(run.logs.is_empty());
    assert!(run.actions.is_empty());
}

#[test]
fn test_run_result_serialization() {
    let json = serde_json::to_value(RunResult::Aborted).expect("Failed to serialize RunResult");
    assert_eq!(json, "ABORTED");

    let deserialized: RunResult =
        serde_json::from_value(json).expect("Failed to deserialize RunResult");
    assert_eq!(deserialized, RunResult::Aborted);

    assert!(serde_json::from_str::<RunResult>("\"CANCELLED\"").is_err());
}

#[test]
fn test_cause_of_interruption_variants() {
    let causes = vec![
        CauseOfInterruption::user("alice"),
        CauseOfInterruption::Timeout { limit_secs: 600 },
        CauseOfInterruption::UpstreamFailure {
            upstream: "libs".to_string(),
            result: RunResult::Failure,
        },
        CauseOfInterruption::custom("maintenance window"),
    ];

    let json = serde_json::to_string(&causes).expect("Failed to serialize causes");
    let back: Vec<CauseOfInterruption> =
        serde_json::from_str(&json).expect("Failed to deserialize causes");

    assert_eq!(back, causes);
}

#[test]
fn test_event_serialization() {
    let run_id = Uuid::new_v4();
    let event = Event::RunInterrupted {
        run_id,
        result: RunResult::Aborted,
        causes: vec!["Aborted by alice".to_string()],
    };

    let json = serde_json::to_value(&event).expect("Failed to serialize Event");

    assert_eq!(json["type"], "runInterrupted");
    assert_eq!(json["payload"]["run_id"], run_id.to_string());
    assert_eq!(json["payload"]["result"], "ABORTED");
    assert_eq!(json["payload"]["causes"][0], "Aborted by alice");
}

#[test]
fn test_global_config_from_toml() {
    let config: GlobalConfig = toml::from_str(
        r#"
checkpoint-dir = "/var/lib/stepkit"
abort-result = "FAILURE"
"#,
    )
    .expect("Failed to parse GlobalConfig");

    assert_eq!(config.checkpoint_dir, PathBuf::from("/var/lib/stepkit"));
    assert_eq!(config.abort_result, RunResult::Failure);
    assert_eq!(config.event_buffer, 100);
}

#[test]
fn test_global_config_defaults() {
    let config: GlobalConfig = toml::from_str("").expect("Failed to parse empty GlobalConfig");
    assert_eq!(config, GlobalConfig::default());
}
