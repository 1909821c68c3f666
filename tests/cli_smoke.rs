use std::process::Command;

use tempfile::tempdir;

fn inyeon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_inyeon"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn cli_questions_dump() {
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("questions.json");

    let status = inyeon()
        .arg("questions")
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(v["questions"].as_array().unwrap().len(), 15);
    assert!(v["version"].as_str().is_some());
}

#[test]
fn cli_classify_records_and_exports() {
    let dir = tempdir().unwrap();
    let answers = dir.path().join("answers.json");
    let out_path = dir.path().join("assessment.json");
    let db = dir.path().join("store.sqlite");
    let export = dir.path().join("export.jsonl");
    std::fs::write(&answers, serde_json::to_string(&vec![1; 15]).unwrap()).unwrap();

    let status = inyeon()
        .arg("classify")
        .arg("--answers")
        .arg(&answers)
        .args(["--user", "u-77"])
        .arg("--store")
        .arg(&db)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let archetype = v["archetype"].as_str().unwrap().to_string();
    assert!(!v["profile"]["name"].as_str().unwrap().is_empty());
    assert!(!v["profile"]["tags"].as_array().unwrap().is_empty());

    let status = inyeon()
        .arg("store-export")
        .arg("--db")
        .arg(&db)
        .arg("--out")
        .arg(&export)
        .status()
        .unwrap();
    assert!(status.success());
    let raw = std::fs::read_to_string(&export).unwrap();
    let row: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
    assert_eq!(row["user_id"], "u-77");
    assert_eq!(row["archetype"], archetype.as_str());
}

#[test]
fn cli_classify_rejects_partial_sheet() {
    let dir = tempdir().unwrap();
    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, r#"{"answers": [0, 1, null]}"#).unwrap();

    let output = inyeon()
        .arg("classify")
        .arg("--answers")
        .arg(&answers)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("InputIncomplete"));
}

#[test]
fn cli_matches_and_insights() {
    let dir = tempdir().unwrap();
    let pool = dir.path().join("pool.json");
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    let matches_out = dir.path().join("matches.json");
    let insights_out = dir.path().join("insights.json");

    let profiles = serde_json::json!({
        "users": [
            { "_id": "me", "personalityType": "GrowthSeeker", "city": "서울" },
            { "_id": "x", "personalityType": "WiseMentor", "city": "서울" },
            { "_id": "y", "personalityType": "StablePragmatist", "city": "부산" },
            { "_id": "z", "city": "서울" }
        ]
    });
    std::fs::write(&pool, profiles.to_string()).unwrap();
    std::fs::write(&a, profiles["users"][0].to_string()).unwrap();
    std::fs::write(&b, profiles["users"][1].to_string()).unwrap();

    let status = inyeon()
        .arg("matches")
        .arg("--pool")
        .arg(&pool)
        .args(["--user", "me", "--city", "서울"])
        .arg("--out")
        .arg(&matches_out)
        .status()
        .unwrap();
    assert!(status.success());
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&matches_out).unwrap()).unwrap();
    let list = v.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["profile"]["id"], "x");
    assert_eq!(list[0]["compatibilityScore"], 86);
    assert_eq!(list[1]["compatibilityScore"], 70);

    let status = inyeon()
        .arg("insights")
        .arg("--a")
        .arg(&a)
        .arg("--b")
        .arg(&b)
        .arg("--out")
        .arg(&insights_out)
        .status()
        .unwrap();
    assert!(status.success());
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&insights_out).unwrap()).unwrap();
    assert_eq!(v["compatibilityAnalysis"]["score"], 86);
    assert_eq!(v["fallback"], false);
}
