use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(envs: &[(&str, &Path)]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_timetabled");
    let mut cmd = Command::new(exe);
    cmd.env_remove("TIMETABLED_WORKSPACE")
        .env_remove("TIMETABLED_SEED")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    for (key, value) in envs {
        cmd.env(key, value);
    }
    let mut child = cmd.spawn().expect("spawn timetabled");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn workspace_keeps_edits_across_restarts() {
    let workspace = temp_dir("timetabled-workspace");

    let assigned_id = {
        let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
        let selected = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );
        assert_eq!(selected["scheduledCount"], json!(2));
        assert!(workspace.join("timetable.sqlite3").is_file());

        let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
        assert_eq!(health["store"], json!("sqlite"));

        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "3",
            "grid.click",
            json!({ "day": "Thursday", "time": "08:00" }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "4",
            "dialog.selectSubject",
            json!({ "subjectId": "2" }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "5",
            "dialog.selectTeacher",
            json!({ "teacherId": "2" }),
        );
        let confirmed = request_ok(&mut stdin, &mut reader, "6", "dialog.confirm", json!({}));
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "7",
            "grid.resize",
            json!({ "courseId": "7", "duration": 100 }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "8",
            "grid.unassign",
            json!({ "courseId": "6" }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "9",
            "subjects.delete",
            json!({ "subjectId": "5", "confirm": true }),
        );

        drop(stdin);
        let _ = child.wait();
        confirmed["course"]["id"].as_str().expect("course id").to_string()
    };

    // Reopened through the environment this time; the seed must not be
    // applied a second time.
    let (mut child, mut stdin, mut reader) =
        spawn_sidecar(&[("TIMETABLED_WORKSPACE", workspace.as_path())]);

    let slot = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grid.slot",
        json!({ "day": "Thursday", "time": "08:00" }),
    );
    assert_eq!(slot["course"]["id"], json!(assigned_id));
    assert_eq!(slot["course"]["subject"], json!("Français"));

    let resized = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "grid.slot",
        json!({ "day": "Tuesday", "time": "13:10" }),
    );
    assert_eq!(resized["course"]["duration"], json!(100));

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grid.slot",
        json!({ "day": "Monday", "time": "08:00" }),
    );
    assert_eq!(removed["course"], json!(null));

    let subjects = request_ok(&mut stdin, &mut reader, "4", "subjects.list", json!({}));
    assert_eq!(subjects["count"], json!(8));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn seed_file_replaces_builtin_registries() {
    let dir = temp_dir("timetabled-seed");
    let seed_path = dir.join("seed.json");
    let seed = json!({
        "subjects": [
            { "id": "s1", "name": "Lecture", "color": "#059669" }
        ],
        "teachers": [
            { "id": "t1", "firstName": "Anne", "lastName": "Petit", "subjectIds": ["s1"] }
        ],
        "classes": [
            { "id": "c1", "name": "GS", "level": "Maternelle" }
        ],
        "unscheduledCourses": [
            { "id": "u1", "classId": "c1", "subjectId": "s1", "teacherId": "t1",
              "totalHours": 4, "remainingHours": 4 }
        ]
    });
    std::fs::write(&seed_path, seed.to_string()).expect("write seed");

    let (mut child, mut stdin, mut reader) =
        spawn_sidecar(&[("TIMETABLED_SEED", seed_path.as_path())]);

    let subjects = request_ok(&mut stdin, &mut reader, "1", "subjects.list", json!({}));
    assert_eq!(subjects["count"], json!(1));
    assert_eq!(subjects["subjects"][0]["name"], json!("Lecture"));

    let sidebar = request_ok(&mut stdin, &mut reader, "2", "sidebar.list", json!({}));
    assert_eq!(sidebar["total"], json!(1));
    assert_eq!(sidebar["groups"][0]["courses"][0]["hoursLabel"], json!("4h/4h"));

    let grid = request_ok(&mut stdin, &mut reader, "3", "grid.slot", json!({ "day": "Monday", "time": "08:00" }));
    assert_eq!(grid["course"], json!(null));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn broken_seed_file_aborts_start_up() {
    let dir = temp_dir("timetabled-bad-seed");
    let seed_path = dir.join("seed.json");
    std::fs::write(&seed_path, "{ \"subjects\": [").expect("write seed");

    let exe = env!("CARGO_BIN_EXE_timetabled");
    let status = Command::new(exe)
        .env_remove("TIMETABLED_WORKSPACE")
        .env("TIMETABLED_SEED", &seed_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run timetabled");
    assert!(!status.success());

    let _ = std::fs::remove_dir_all(dir);
}
