use ptf_domain::Capability;
use ptf_domain::config::{DispatchConfig, FrameworkConfig, LoggingConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.console);
    assert!(logging.directory.is_none());
    assert_eq!(logging.max_files, 10);

    let dispatch = DispatchConfig::default();
    assert_eq!(dispatch.thread_name, "ptf-dispatch");
    assert_eq!(dispatch.queue_warn_depth, 256);

    let cfg = FrameworkConfig::default();
    assert!(cfg.platform.participants.is_empty());
}

#[test]
fn framework_config_deserializes() {
    let raw = json!({
        "logging": { "level": "debug", "json": true },
        "dispatch": { "queue_warn_depth": 8 },
        "platform": {
            "participants": [{
                "name": "TCPU",
                "domains": [{
                    "name": "package",
                    "controls": { "energy_control": 2, "soc_workload_classification": 1 },
                    "primitives": { "get_participant_energy_threshold": 1200 },
                    "buffers": { "get_rapl_energy_counter_info": [1, 0, 0, 0, 0, 0, 0, 0] }
                }]
            }]
        }
    });

    let cfg: FrameworkConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
    assert_eq!(cfg.dispatch.queue_warn_depth, 8);
    assert_eq!(cfg.dispatch.thread_name, "ptf-dispatch");

    let domain = &cfg.platform.participants[0].domains[0];
    assert_eq!(domain.controls.version(Capability::EnergyControl), Some(2));
    assert_eq!(domain.controls.version(Capability::ParticipantSetSpecificInfo), None);
    assert_eq!(domain.primitives["get_participant_energy_threshold"], 1200);
    assert_eq!(domain.buffers["get_rapl_energy_counter_info"].len(), 8);
}

#[test]
fn config_is_cheap_to_clone_and_copy_on_write() {
    let base = FrameworkConfig::default();
    let mut tuned = base.clone();
    tuned.dispatch.queue_warn_depth = 1;

    assert_eq!(base.dispatch.queue_warn_depth, 256);
    assert_eq!(tuned.dispatch.queue_warn_depth, 1);
}
