use ptf::domain::config::FrameworkConfig;
use ptf::events::ActivityData;
use ptf::kernel::config::load_config;
use ptf_daemon::Daemon;
use ptf_daemon::args::EventArg;
use std::fs;

const CONFIG: &str = r#"
[dispatch]
thread_name = "ptf-daemon-test"

[[platform.participants]]
name = "cpu"

[[platform.participants.domains]]
name = "package"
controls = { energy_control = 1 }
primitives = { get_rapl_energy_counter = 900, get_rapl_energy_unit = 14 }

[[platform.participants]]
name = "battery"

[[platform.participants.domains]]
name = "pack"
controls = { participant_set_specific_info = 1 }
"#;

fn config() -> (tempfile::TempDir, FrameworkConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ptf.toml");
    fs::write(&path, CONFIG).unwrap();
    let cfg = load_config(Some(&path)).unwrap();
    (dir, cfg)
}

#[test]
fn batch_run_dispatches_requested_events() {
    let (_dir, cfg) = config();
    assert_eq!(cfg.dispatch.thread_name, "ptf-daemon-test");
    assert_eq!(cfg.platform.participants.len(), 2);

    let events = ["DomainBatteryStatusChanged@1:0", "Suspend@0", "Resume@7"]
        .into_iter()
        .map(|s| s.parse::<EventArg>().unwrap().0);

    let summary = Daemon::builder().config(cfg).events(events).activity(true).build().run().unwrap();

    // Policy load, 2 participant and 2 domain creates, 2 activity toggles,
    // then the 3 requested events.
    assert_eq!(summary.executed, 10);
    assert_eq!(summary.policy_events, 10);
    assert_eq!(summary.status.participants.len(), 2);
    assert_eq!(summary.status.policies[0].name, "event-log");
    assert!(summary.status.participants.iter().all(|p| p.activity_logging));

    assert!(summary.activity.iter().any(|record| matches!(
        record.activity.data,
        ActivityData::EnergyControl { energy_counter: 900, .. }
    )));
}

#[test]
fn empty_platform_runs_cleanly() {
    let summary = Daemon::builder().build().run().unwrap();
    assert_eq!(summary.executed, 1);
    assert!(summary.status.participants.is_empty());
    assert!(summary.activity.is_empty());
}

#[test]
fn unknown_primitive_in_config_fails_the_run() {
    let (_dir, mut cfg) = config();
    cfg.platform.participants[0].domains[0].primitives.insert("get_flux".to_owned(), 1);

    let err = Daemon::builder().config(cfg).build().run().unwrap_err();
    assert!(format!("{err:#}").contains("get_flux"));
}
