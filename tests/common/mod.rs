use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub activity: PathBuf,
    pub out_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let activity = tmp.path().join("activity.json");
        write_activity(&activity, mixed_activity());

        let out_dir = tmp.path().join("out");

        Self {
            _tmp: tmp,
            home,
            activity,
            out_dir,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("redsona").expect("binary built");
        cmd.env("HOME", &self.home)
            .env("REDSONA_GENERATED_AT", "2024-05-01T12:00:00Z");
        cmd
    }

    /// `analyze` against the fixture activity file, JSON mode, asserting
    /// success.
    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--activity-file")
            .arg(&self.activity)
            .arg("--out-dir")
            .arg(&self.out_dir)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn report_path(&self, username: &str) -> PathBuf {
        self.out_dir.join(format!("{}_persona.txt", username))
    }
}

pub fn write_activity(path: &Path, items: Value) {
    fs::write(path, serde_json::to_string_pretty(&items).expect("serialize fixture"))
        .expect("write activity fixture");
}

/// 2 positive-phrased, 2 negative-phrased, 1 ambiguous item; technology 3,
/// gaming 2.
pub fn mixed_activity() -> Value {
    json!([
        {
            "id": "p1",
            "kind": "post",
            "community": "technology",
            "created_utc": 1714550000,
            "raw_text": "My first machine learning project. Just finished the model and the experience was amazing, I learned so much.",
            "score": 45,
            "permalink": "https://reddit.com/r/technology/comments/p1"
        },
        {
            "id": "p2",
            "kind": "post",
            "community": "gaming",
            "created_utc": 1714540000,
            "raw_text": "Finally built my dream gaming setup. The performance is incredible, I love it.",
            "score": 23,
            "permalink": "https://reddit.com/r/gaming/comments/p2"
        },
        {
            "id": "c1",
            "kind": "comment",
            "community": "technology",
            "created_utc": 1714530000,
            "raw_text": "This driver update is terrible, the install is broken again.",
            "score": 3,
            "permalink": "https://reddit.com/r/technology/comments/c1"
        },
        {
            "id": "c2",
            "kind": "comment",
            "community": "gaming",
            "created_utc": 1714520000,
            "raw_text": "Awful port. The controls are a problem and the framerate is worse than the original.",
            "score": 8,
            "permalink": "https://reddit.com/r/gaming/comments/c2"
        },
        {
            "id": "c3",
            "kind": "comment",
            "community": "technology",
            "created_utc": 1714510000,
            "raw_text": "The patch notes mention the scheduler and the new config format.",
            "score": 6,
            "permalink": "https://reddit.com/r/technology/comments/c3"
        }
    ])
}
