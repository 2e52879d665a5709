use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradejournald");
    let mut child = Command::new(exe)
        .env_remove("GRADEJOURNALD_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradejournald");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
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

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn assert_series(actual: &serde_json::Value, expected: &[f64]) {
    let values: Vec<f64> = actual
        .as_array()
        .expect("series array")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect();
    assert_eq!(values.len(), expected.len(), "series {:?}", values);
    for (a, e) in values.iter().zip(expected) {
        assert!((a - e).abs() < 0.01, "got {:?}, want {:?}", values, expected);
    }
}

#[test]
fn class_table_covers_every_class_and_subject() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(&mut stdin, &mut reader, "1", "journal.loadSample", json!({}));

    let table = request_ok(&mut stdin, &mut reader, "2", "stats.classTable", json!({}));
    assert_eq!(table["empty"], false);
    let rows = table["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 12);

    let first = &rows[0];
    assert_eq!(first["class"], "10A");
    assert_eq!(first["subject"], "Math");
    assert_eq!(first["subjectLabel"], "Математика");
    assert_eq!(first["display"]["average"], "4.50");
    assert_eq!(first["display"]["median"], "4.50");
    assert_eq!(first["display"]["counts"], json!(["0", "0", "0", "1", "1"]));
    assert_eq!(
        first["display"]["percents"],
        json!(["0.00", "0.00", "0.00", "50.00", "50.00"])
    );
    assert_eq!(first["stats"]["gradeCount"]["5"], 1);

    let classes: Vec<&str> = rows.iter().filter_map(|r| r["class"].as_str()).collect();
    assert_eq!(&classes[..4], &["10A"; 4]);
    assert_eq!(&classes[8..], &["11A"; 4]);

    let _ = child.kill();
}

#[test]
fn overall_table_pools_all_students() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(&mut stdin, &mut reader, "1", "journal.loadSample", json!({}));

    let table = request_ok(&mut stdin, &mut reader, "2", "stats.overallTable", json!({}));
    let rows = table["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 4);

    let math = &rows[0];
    assert_eq!(math["subject"], "Math");
    assert_eq!(math["display"]["average"], "4.33");
    assert_eq!(math["display"]["median"], "4.50");
    assert_eq!(math["display"]["counts"], json!(["0", "0", "1", "2", "3"]));
    assert_eq!(
        math["display"]["percents"],
        json!(["0.00", "0.00", "16.67", "33.33", "50.00"])
    );

    let subjects: Vec<&str> = rows.iter().filter_map(|r| r["subject"].as_str()).collect();
    assert_eq!(subjects, vec!["Math", "Russian", "Physics", "Literature"]);

    let _ = child.kill();
}

#[test]
fn tables_and_charts_on_empty_journal() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let class_table = request_ok(&mut stdin, &mut reader, "1", "stats.classTable", json!({}));
    assert_eq!(class_table["empty"], true);
    assert_eq!(class_table["rows"], json!([]));

    let overall = request_ok(&mut stdin, &mut reader, "2", "stats.overallTable", json!({}));
    assert_eq!(overall["empty"], true);

    let averages = request_ok(&mut stdin, &mut reader, "3", "charts.classAverages", json!({}));
    assert_eq!(averages["empty"], true);
    assert_eq!(averages["labels"], json!([]));

    let perf = request_ok(&mut stdin, &mut reader, "4", "charts.overallPerformance", json!({}));
    assert_eq!(perf["empty"], true);

    let _ = child.kill();
}

#[test]
fn class_averages_follow_class_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(&mut stdin, &mut reader, "1", "journal.loadSample", json!({}));

    let chart = request_ok(&mut stdin, &mut reader, "2", "charts.classAverages", json!({}));
    assert_eq!(chart["labels"], json!(["10A", "10B", "11A"]));
    let datasets = chart["datasets"].as_array().expect("datasets");
    assert_eq!(datasets.len(), 4);
    assert_eq!(datasets[0]["subject"], "Math");
    assert_eq!(datasets[0]["label"], "Математика");
    assert_series(&datasets[0]["data"], &[4.5, 4.0, 4.5]);
    assert_series(&datasets[1]["data"], &[4.5, 3.5, 4.5]);
    assert_series(&datasets[2]["data"], &[4.5, 4.5, 4.0]);
    assert_series(&datasets[3]["data"], &[4.5, 3.5, 4.5]);

    let _ = child.kill();
}

#[test]
fn grade_distribution_has_one_series_per_grade() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(&mut stdin, &mut reader, "1", "journal.loadSample", json!({}));

    let chart = request_ok(&mut stdin, &mut reader, "2", "charts.gradeDistribution", json!({}));
    assert_eq!(
        chart["labels"],
        json!(["Математика", "Русский язык", "Физика", "Литература"])
    );
    let datasets = chart["datasets"].as_array().expect("datasets");
    assert_eq!(datasets.len(), 5);
    assert_eq!(datasets[0]["grade"], 1);
    assert_eq!(datasets[0]["data"], json!([0, 0, 0, 0]));
    assert_eq!(datasets[2]["label"], "Оценка 3");
    assert_eq!(datasets[2]["data"], json!([1, 1, 1, 1]));
    assert_eq!(datasets[4]["data"], json!([3, 2, 3, 2]));

    let _ = child.kill();
}

#[test]
fn overall_performance_averages_each_subject() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(&mut stdin, &mut reader, "1", "journal.loadSample", json!({}));

    let chart = request_ok(&mut stdin, &mut reader, "2", "charts.overallPerformance", json!({}));
    assert_eq!(chart["label"], "Средняя оценка");
    assert_eq!(chart["subjects"], json!(["Math", "Russian", "Physics", "Literature"]));
    assert_series(&chart["data"], &[4.33, 4.17, 4.33, 4.17]);

    let _ = child.kill();
}

#[test]
fn huge_grades_keep_the_sidecar_alive() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "journal.loadRows",
        json!({
            "rows": [
                ["Class", "FullName", "Math"],
                ["10A", "Иванов", "9223372036854775807"],
                ["10A", "Петрова", "5"],
                ["10B", "Сидоров", "99999999999999999999"]
            ]
        }),
    );

    let overall = request_ok(&mut stdin, &mut reader, "2", "stats.overallTable", json!({}));
    let math = &overall["rows"][0];
    assert_eq!(math["subject"], "Math");
    assert_eq!(math["stats"]["gradeCount"]["5"], 1);
    assert!(math["stats"]["average"].as_f64().unwrap_or(0.0) > 1e18);

    let averages = request_ok(&mut stdin, &mut reader, "3", "charts.classAverages", json!({}));
    assert_eq!(averages["labels"], json!(["10A", "10B"]));

    let health = request_ok(&mut stdin, &mut reader, "4", "health", json!({}));
    assert_eq!(health["recordCount"], 3);

    let _ = child.kill();
}
