use attendance_trends::analyzers::analyzer::{analyze, run};
use attendance_trends::config::MetricsConfig;
use attendance_trends::output::Cell;
use attendance_trends::value::Value;
use attendance_trends::window::WindowStrategy;
use std::env;
use std::fs;
use std::path::PathBuf;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("raw_data")).unwrap();

    let raw = dir.join("raw_data");
    fs::write(raw.join("alpha.csv"), "Alpha,Fan Con\n6/1/2018,100\n6/1/2019,150\n").unwrap();
    fs::write(raw.join("beta.csv"), "Beta\n3/1/2019,50\n").unwrap();
    fs::write(raw.join("gamma.csv"), "Gamma\n2010,20\n2011,unknown\n6/1/2013,30\n").unwrap();
    dir
}

fn config() -> MetricsConfig {
    MetricsConfig::from_json(r#"{ "blackout": null, "as_of": "01/01/2025" }"#).unwrap()
}

#[test]
fn test_full_pipeline() {
    let dir = fixture_dir("attendance_trends_it_pipeline");
    let output = dir.join("out").join("viz_data.json");
    let tables = dir.join("tables");

    let chart = run(&dir.join("raw_data"), &output, Some(&tables), &config())
        .expect("pipeline failed");

    assert_eq!(chart.min_year, Some(2010));
    assert_eq!(chart.max_year, Some(2020));
    assert_eq!(chart.sort_order, vec!["Alpha", "Beta", "Gamma"]);

    let share = chart.column("Alpha-twelveMonths").unwrap();
    assert_eq!(share[2], Cell::number(0.75));
    let growth = chart.column("Alpha-growth").unwrap();
    assert_eq!(growth[1], Cell::Number(Value::Unavailable));
    assert_eq!(growth[2], Cell::number(0.5));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["categories"]["Alpha"], "Fan Con");
    assert_eq!(json["Alpha-twelveMonths"][2], 0.75);
    // 2011 has unknown attendance; 2011 → 2013 leaves a gap marker
    assert_eq!(json["Gamma-attendance"][2], "*");
    assert_eq!(json["Gamma-attendance"][3], "*");
    assert_eq!(json["Gamma-attendance"][4], 30);

    let attendance = fs::read_to_string(tables.join("attendance.csv")).unwrap();
    let lines: Vec<_> = attendance.lines().collect();
    assert_eq!(lines[0], "YEAR,Alpha,Beta,Gamma");
    assert_eq!(lines.len(), 1 + 10);
    assert_eq!(lines[2], "2011,0,0,*");
    assert_eq!(lines[3], "2012,0,0,*");
    assert_eq!(lines[10], "2019,150,50,0");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_strategies_produce_same_chart() {
    let dir = fixture_dir("attendance_trends_it_strategies");
    let raw = dir.join("raw_data");

    let mut indexed = config();
    indexed.window_strategy = WindowStrategy::Indexed;

    let a = serde_json::to_value(analyze(&raw, &config()).unwrap()).unwrap();
    let b = serde_json::to_value(analyze(&raw, &indexed).unwrap()).unwrap();
    assert_eq!(a, b);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_default_blackout_suppresses_share() {
    let dir = env::temp_dir().join("attendance_trends_it_blackout");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("a.csv"), "A\n6/1/2019,100\n6/1/2020,80\n6/1/2021,90\n9/1/2022,120\n").unwrap();

    let chart = analyze(&dir, &MetricsConfig::default()).unwrap();
    let share = chart.column("A-twelveMonths").unwrap();
    assert_eq!(share[1], Cell::number(1.0));
    assert_eq!(share[2], Cell::Number(Value::Unavailable));
    assert_eq!(share[3], Cell::Number(Value::Unavailable));
    // 9/1/2022 is past the end of the blackout plus one year
    assert_eq!(share[4], Cell::number(1.0));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_empty_input_directory() {
    let dir = env::temp_dir().join("attendance_trends_it_empty");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    let json = serde_json::to_value(analyze(&dir, &config()).unwrap()).unwrap();
    assert!(json["minYear"].is_null());
    assert!(json["maxYear"].is_null());
    assert_eq!(json["sortOrder"], serde_json::json!([]));

    fs::remove_dir_all(&dir).unwrap();
}
