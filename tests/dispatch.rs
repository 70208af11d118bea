//! Integration tests for the task dispatcher.

use pretty_assertions::assert_eq;
use serde_json::json;

use revpipe::dispatch::{dispatch, validate, DispatchError, HandlerContext, ValidationError};
use revpipe::env::Env;

fn ctx(vars: &[(&str, &str)], root: &std::path::Path) -> HandlerContext {
    HandlerContext {
        env: Env::mock(vars.iter().copied()),
        root: root.to_path_buf(),
    }
}

#[test]
fn env_guard_without_credentials_fails() {
    let value = dispatch(&ctx(&[], std::path::Path::new(".")), "env_guard", "{}").unwrap();
    assert_eq!(
        value,
        json!({
            "ok": false,
            "summary": "missing required env: OPENAI_API_KEY, SUPABASE_SERVICE_ROLE_KEY, SUPABASE_URL",
            "artifacts": [],
            "next_actions": []
        })
    );
}

#[test]
fn env_guard_with_credentials_warns_on_unknown_keys() {
    let vars = [
        ("OPENAI_API_KEY", "sk-test"),
        ("SUPABASE_URL", "https://example.supabase.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ("SUPABASE_DEBUG", "1"),
    ];
    let value = dispatch(&ctx(&vars, std::path::Path::new(".")), "env_guard", "").unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(
        value["summary"],
        "env_guard: required env present | WARN unknown env keys: SUPABASE_DEBUG"
    );
}

#[test]
fn unknown_task_and_bad_payloads_are_errors() {
    let ctx = ctx(&[], std::path::Path::new("."));
    assert!(matches!(
        dispatch(&ctx, "lint", "{}"),
        Err(DispatchError::UnknownTask(_))
    ));
    assert!(matches!(
        dispatch(&ctx, "env_guard", "not json"),
        Err(DispatchError::InvalidPayload(_))
    ));
    assert!(matches!(
        dispatch(&ctx, "env_guard", "\"text\""),
        Err(DispatchError::PayloadNotObject)
    ));
}

#[test]
fn validator_contract() {
    assert!(matches!(
        validate(json!({"ok": "yes", "summary": "x"})),
        Err(ValidationError::WrongType { field: "ok", .. })
    ));
    assert_eq!(
        validate(json!({"ok": true, "summary": "x"})).unwrap(),
        json!({"ok": true, "summary": "x", "artifacts": [], "next_actions": []})
    );
}

#[test]
fn i18n_reviewer_writes_report_to_outdir() {
    let work = tempfile::tempdir().unwrap();
    let root = work.path();
    std::fs::create_dir_all(root.join("locales/ja")).unwrap();
    std::fs::write(root.join("locales/ja/common.json"), "{}").unwrap();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(
        root.join("src/Button.tsx"),
        "// 保存ボタン\nexport const label = \"保存する\";\n",
    )
    .unwrap();

    let payload = json!({"root": ".", "outdir": "out"}).to_string();
    let value = dispatch(&ctx(&[], root), "i18n_reviewer", &payload).unwrap();

    assert_eq!(value["ok"], true);
    let summary = value["summary"].as_str().unwrap();
    assert!(summary.contains("1 hardcoded string(s) in 1 file(s)"), "{summary}");
    assert_eq!(value["artifacts"][0]["type"], "note");
    let report = std::fs::read_to_string(root.join("out/i18n-analysis.md")).unwrap();
    assert!(report.contains("保存する"));
}

#[test]
fn db_modeler_reports_typeorm_entities() {
    let work = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(work.path().join("src/entities")).unwrap();
    std::fs::write(
        work.path().join("src/entities/user.entity.ts"),
        "@Entity('users')\nexport class User {\n  @PrimaryGeneratedColumn()\n  id: number;\n\n  @Column()\n  email: string;\n}\n",
    )
    .unwrap();

    let value = dispatch(&ctx(&[], work.path()), "db_modeler", "{}").unwrap();
    assert_eq!(value["ok"], true);
    assert!(value["summary"].as_str().unwrap().ends_with("1 typeorm entity"));
    assert_eq!(value["artifacts"], json!([]));
}
