use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_timetabled");
    let mut child = Command::new(exe)
        .env_remove("TIMETABLED_WORKSPACE")
        .env_remove("TIMETABLED_SEED")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn timetabled");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_line(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request(
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

    let value = read_line(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let calls = [
        ("health", json!({})),
        ("periods.list", json!({})),
        ("subjects.list", json!({})),
        ("subjects.palette", json!({})),
        ("teachers.list", json!({})),
        ("classes.list", json!({})),
        ("sidebar.list", json!({})),
        ("sidebar.dragPayload", json!({ "courseId": "1" })),
        ("view.get", json!({})),
        ("view.set", json!({ "viewType": "school" })),
        ("grid.get", json!({})),
        ("grid.slot", json!({ "day": "Monday", "time": "08:00" })),
        ("grid.click", json!({ "day": "Monday", "time": "08:50" })),
        ("dialog.get", json!({})),
        ("dialog.selectSubject", json!({ "subjectId": "1" })),
        ("dialog.selectTeacher", json!({ "teacherId": "1" })),
        ("dialog.cancel", json!({})),
        ("dialog.confirm", json!({})),
        ("grid.drop", json!({ "courseId": "6", "day": "Friday", "time": "09:40" })),
        ("grid.resize", json!({ "courseId": "7", "duration": 100 })),
        ("grid.unassign", json!({ "courseId": "7" })),
        ("subjects.update", json!({ "subjectId": "9", "patch": { "name": "Sport" } })),
        ("teachers.update", json!({ "teacherId": "5", "patch": { "email": null } })),
        ("classes.update", json!({ "classId": "5", "patch": { "level": "CM2" } })),
        ("subjects.delete", json!({ "subjectId": "8" })),
        ("teachers.delete", json!({ "teacherId": "4" })),
        ("classes.delete", json!({ "classId": "4" })),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let _ = request(&mut stdin, &mut reader, &i.to_string(), method, params);
    }

    let unknown = request(&mut stdin, &mut reader, "u", "marksets.list", json!({}));
    assert_eq!(unknown["ok"], json!(false));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let bad = read_line(&mut reader);
    assert_eq!(bad["ok"], json!(false));
    assert_eq!(bad["error"]["code"], json!("bad_json"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn health_reports_in_memory_store() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["store"], json!("memory"));
    assert_eq!(health["result"]["workspacePath"], json!(null));

    let periods = request(&mut stdin, &mut reader, "2", "periods.list", json!({}));
    let rows = periods["result"]["periods"].as_array().expect("periods");
    assert_eq!(rows.len(), 10);
    assert_eq!(periods["result"]["periodMinutes"], json!(50));
    assert_eq!(periods["result"]["rowHeightPx"], json!(80));

    drop(stdin);
    let _ = child.wait();
}
