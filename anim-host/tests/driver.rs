//! # 宿主集成测试
//!
//! 从磁盘加载配置与资源，运行完整的模拟循环。

use std::fs;
use std::path::Path;

use anim_host::{ConfigOverrides, HostConfig, HostError, Simulation, load_resources};
use anim_runtime::{AnimError, Vector};
use tempfile::TempDir;

const RESOURCES: &str = r#"{
    "sprites": [ { "id": "hero", "film": [ { "width": 16, "height": 24 } ] } ],
    "scripts": [
        {
            "id": "hop",
            "animation": [
                { "id": "up", "translation": { "vec": { "y": -1 }, "delay": 10, "repeat": 3 } },
                { "id": "down", "translation": { "vec": { "y": 1 }, "delay": 10, "repeat": 3 } }
            ]
        },
        {
            "id": "blink",
            "repeat": 0,
            "animation": [ { "flash": { "delay": 10, "repeat": 1 } } ]
        }
    ]
}"#;

fn write_fixture(dir: &TempDir, config: &str) -> std::path::PathBuf {
    fs::write(dir.path().join("animations.json"), RESOURCES).unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, config).unwrap();
    config_path
}

fn load(dir: &TempDir, config: &str) -> HostConfig {
    let config_path = write_fixture(dir, config);
    let mut config = HostConfig::load(&config_path).unwrap().unwrap();
    config.resources = dir.path().join(&config.resources);
    config
}

#[test]
fn test_simulation_from_files() {
    let dir = TempDir::new().unwrap();
    let config = load(
        &dir,
        r#"{
            "resources": "animations.json",
            "tick_ms": 10,
            "ticks": 6,
            "nodes": [ { "id": "hero", "sprite_id": "hero", "position": { "y": 50 } } ],
            "plays": [ { "node_id": "hero", "script_id": "hop" } ]
        }"#,
    );
    config.validate().unwrap();

    let library = load_resources(&config.resources).unwrap();
    let mut simulation = Simulation::new(&config, library);
    let report = simulation.run().unwrap();

    assert_eq!(report.ticks, 6);
    assert_eq!(report.nodes[0].position, Vector::new(0.0, 50.0, 0.0));
    assert_eq!(
        report.events,
        vec!["hero.hop.up.done", "hero.hop.down.done", "hero.hop.done"]
    );
    assert_eq!(report.running_scripts, 0);
}

#[test]
fn test_cli_overrides_and_schedule() {
    let dir = TempDir::new().unwrap();
    let mut config = load(
        &dir,
        r#"{
            "resources": "animations.json",
            "tick_ms": 10,
            "ticks": 100,
            "nodes": [ { "id": "hero", "sprite_id": "hero" } ],
            "schedule": [
                { "tick": 2, "action": { "action": "pause", "node_id": "hero" } },
                { "tick": 4, "action": { "action": "resume", "node_id": "hero", "script_id": "blink" } }
            ]
        }"#,
    );
    config.apply_overrides(ConfigOverrides {
        ticks: Some(5),
        plays: vec!["hero:blink".parse().unwrap()],
        ..Default::default()
    });

    let library = load_resources(&config.resources).unwrap();
    let mut simulation = Simulation::new(&config, library);
    let report = simulation.run().unwrap();

    // tick 0、1、4 闪烁，tick 2、3 暂停
    assert_eq!(report.ticks, 5);
    assert!(!report.nodes[0].visible);
    assert_eq!(report.running_scripts, 1);
    assert_eq!(
        report.events.iter().filter(|id| id.ends_with(".rewind")).count(),
        3
    );
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let loaded = HostConfig::load(dir.path().join("nope.json")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_config_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.json");
    let config = HostConfig {
        ticks: 7,
        plays: vec!["hero:hop".parse().unwrap()],
        ..Default::default()
    };
    config.save(&path).unwrap();

    assert_eq!(HostConfig::load(&path).unwrap(), Some(config));
}

#[test]
fn test_unknown_script_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = load(
        &dir,
        r#"{
            "resources": "animations.json",
            "nodes": [ { "id": "hero" } ],
            "plays": [ { "node_id": "hero", "script_id": "teleport" } ]
        }"#,
    );

    let library = load_resources(&config.resources).unwrap();
    let mut simulation = Simulation::new(&config, library);
    let err = simulation.run().unwrap_err();
    assert!(matches!(err, HostError::Anim(AnimError::UnknownScript { .. })));
}

#[test]
fn test_broken_resource_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{ "scripts": [ { "id": "a" }, { "id": "a" } ] }"#).unwrap();

    let err = load_resources(&path).unwrap_err();
    assert!(matches!(err, HostError::Resource { .. }));

    let err = load_resources(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, HostError::Io { .. }));
}

#[test]
fn test_shipped_demo_runs_with_default_paths() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut config = HostConfig::load(root.join("demos/config.json")).unwrap().unwrap();
    assert_eq!(config.resources, HostConfig::default().resources);
    config.resources = root.join(&config.resources);
    config.validate().unwrap();

    let library = load_resources(&config.resources).unwrap();
    let mut simulation = Simulation::new(&config, library);
    let report = simulation.run().unwrap();
    assert_eq!(report.ticks, 90);
    assert!(report.events.iter().any(|id| id == "hero.jump.done"));
}
