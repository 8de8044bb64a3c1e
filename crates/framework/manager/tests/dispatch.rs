use parking_lot::Mutex;
use proptest::prelude::*;
use ptf_domain::config::CapabilityVersions;
use ptf_domain::{DomainIndex, ParticipantIndex, PolicyIndex};
use ptf_events::{FrameworkEvent, ParticipantEvent};
use ptf_manager::{Dispatcher, ParticipantOutcome, WorkItem};
use ptf_participant::primitive::MemoryPrimitives;
use ptf_participant::{Participant, ParticipantBuilder, ParticipantError, ParticipantExtension, ParticipantRegistry};
use ptf_policy::{Policy, PolicyError, PolicyEvent, PolicyManager};
use std::sync::Arc;

type Seen = Arc<Mutex<Vec<(ParticipantIndex, FrameworkEvent, Option<DomainIndex>)>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Accept,
    Fail,
    Panic,
}

#[derive(Debug)]
struct Scripted {
    name: String,
    behavior: Behavior,
    seen: Arc<Mutex<Vec<PolicyEvent>>>,
}

impl Scripted {
    fn new(name: impl Into<String>, behavior: Behavior) -> (Self, Arc<Mutex<Vec<PolicyEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (Self { name: name.into(), behavior, seen: Arc::clone(&seen) }, seen)
    }
}

impl Policy for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &PolicyEvent) -> Result<(), PolicyError> {
        self.seen.lock().push(*event);
        match self.behavior {
            Behavior::Accept => Ok(()),
            Behavior::Fail => Err("thermal table rejected".into()),
            Behavior::Panic => panic!("policy {} blew up", self.name),
        }
    }
}

#[derive(Debug)]
struct ScriptedExtension {
    behavior: Behavior,
    seen: Seen,
}

impl ParticipantExtension for ScriptedExtension {
    fn on_event(
        &self,
        participant: &Participant,
        event: FrameworkEvent,
        domain: Option<DomainIndex>,
    ) -> Result<(), ParticipantError> {
        self.seen.lock().push((participant.index(), event, domain));
        match self.behavior {
            Behavior::Accept => Ok(()),
            Behavior::Fail => Err(ParticipantError::Handler { message: "extension failed".into(), context: None }),
            Behavior::Panic => panic!("extension panicked"),
        }
    }
}

struct Harness {
    participants: Arc<ParticipantRegistry>,
    policies: Arc<PolicyManager>,
    dispatcher: Dispatcher,
}

fn harness() -> Harness {
    let participants = Arc::new(ParticipantRegistry::new());
    let policies = Arc::new(PolicyManager::new());
    let dispatcher = Dispatcher::new(Arc::clone(&participants), Arc::clone(&policies));
    Harness { participants, policies, dispatcher }
}

fn battery(name: &str, behavior: Behavior, seen: &Seen) -> ParticipantBuilder {
    ParticipantBuilder::new(name, Arc::new(MemoryPrimitives::new()))
        .domain("battery", CapabilityVersions::default())
        .extension(ScriptedExtension { behavior, seen: Arc::clone(seen) })
}

#[test]
fn domain_event_reaches_only_its_participant_and_every_policy() {
    let h = harness();
    let seen = Seen::default();
    let p0 = h.participants.create(battery("p0", Behavior::Accept, &seen)).unwrap().index();
    let p1 = h.participants.create(battery("p1", Behavior::Accept, &seen)).unwrap().index();
    let p2 = h.participants.create(battery("p2", Behavior::Accept, &seen)).unwrap().index();

    let (a, a_seen) = Scripted::new("active", Behavior::Accept);
    let (b, b_seen) = Scripted::new("passive", Behavior::Accept);
    let a = h.policies.load(a).unwrap();
    let b = h.policies.load(b).unwrap();

    let d0 = DomainIndex::new(0);
    let report = h.dispatcher.execute(WorkItem::for_domain(ParticipantEvent::DomainBatteryStatusChanged, p1, d0));

    assert_eq!(report.participant, ParticipantOutcome::Handled);
    assert_eq!(report.delivered, vec![a, b]);
    assert!(report.faulted.is_empty());

    assert_eq!(*seen.lock(), vec![(p1, FrameworkEvent::DomainBatteryStatusChanged, Some(d0))]);
    assert!(seen.lock().iter().all(|(p, ..)| *p != p0 && *p != p2));

    let expected = PolicyEvent::new(FrameworkEvent::DomainBatteryStatusChanged, p1, Some(d0));
    assert_eq!(*a_seen.lock(), vec![expected]);
    assert_eq!(*b_seen.lock(), vec![expected]);
}

#[test]
fn unknown_participant_still_fans_out() {
    let h = harness();
    let (policy, seen) = Scripted::new("critical", Behavior::Accept);
    let index = h.policies.load(policy).unwrap();

    let ghost = ParticipantIndex::new(9);
    let report = h.dispatcher.execute(WorkItem::new(ParticipantEvent::Suspend, ghost));

    assert_eq!(report.participant, ParticipantOutcome::InvalidIndex);
    assert_eq!(report.delivered, vec![index]);
    assert_eq!(seen.lock()[0].participant, Some(ghost));
}

#[test]
fn unknown_domain_is_an_invalid_index() {
    let h = harness();
    let seen = Seen::default();
    let p = h.participants.create(battery("p0", Behavior::Accept, &seen)).unwrap().index();
    let (policy, _) = Scripted::new("active", Behavior::Accept);
    let index = h.policies.load(policy).unwrap();

    let item = WorkItem::for_domain(ParticipantEvent::DomainTemperatureThresholdCrossed, p, DomainIndex::new(4));
    let report = h.dispatcher.execute(item);

    assert_eq!(report.participant, ParticipantOutcome::InvalidIndex);
    assert_eq!(report.delivered, vec![index]);
    assert!(seen.lock().is_empty(), "extension must not run for an unresolved domain");
}

#[test]
fn failing_and_panicking_participants_are_contained() {
    for behavior in [Behavior::Fail, Behavior::Panic] {
        let h = harness();
        let seen = Seen::default();
        let p = h.participants.create(battery("flaky", behavior, &seen)).unwrap().index();
        let (policy, policy_seen) = Scripted::new("active", Behavior::Accept);
        let index = h.policies.load(policy).unwrap();

        let report = h.dispatcher.execute(WorkItem::new(ParticipantEvent::Resume, p));

        assert_eq!(report.participant, ParticipantOutcome::Faulted, "{behavior:?}");
        assert_eq!(report.delivered, vec![index]);
        assert_eq!(policy_seen.lock().len(), 1);
    }
}

#[test]
fn policy_failures_do_not_stop_the_fan_out() {
    let h = harness();
    let (first, first_seen) = Scripted::new("first", Behavior::Panic);
    let (second, second_seen) = Scripted::new("second", Behavior::Fail);
    let (third, third_seen) = Scripted::new("third", Behavior::Accept);
    let first = h.policies.load(first).unwrap();
    let second = h.policies.load(second).unwrap();
    let third = h.policies.load(third).unwrap();

    let report = h.dispatcher.execute(WorkItem::framework(FrameworkEvent::GetStatus));

    assert_eq!(report.participant, ParticipantOutcome::NotAddressed);
    assert_eq!(report.faulted, vec![first, second]);
    assert_eq!(report.delivered, vec![third]);
    assert_eq!(first_seen.lock().len(), 1);
    assert_eq!(second_seen.lock().len(), 1);
    assert_eq!(third_seen.lock().len(), 1);

    // The dispatcher is still usable after a panic.
    let report = h.dispatcher.execute(WorkItem::framework(FrameworkEvent::GetStatus));
    assert_eq!(report.delivered, vec![third]);
}

#[derive(Debug)]
struct Evictor {
    manager: Arc<PolicyManager>,
    target: Mutex<Option<PolicyIndex>>,
}

impl Policy for Evictor {
    fn name(&self) -> &str {
        "evictor"
    }

    fn on_event(&self, _event: &PolicyEvent) -> Result<(), PolicyError> {
        if let Some(target) = self.target.lock().take() {
            self.manager.unload(target)?;
        }
        Ok(())
    }
}

#[test]
fn policy_unloaded_mid_fan_out_is_skipped_and_the_rest_still_run() {
    let h = harness();
    let evictor = Arc::new(Evictor { manager: Arc::clone(&h.policies), target: Mutex::new(None) });
    let e = h.policies.load_shared(Arc::clone(&evictor) as Arc<dyn Policy>).unwrap();
    let (victim, victim_seen) = Scripted::new("victim", Behavior::Accept);
    let (survivor, survivor_seen) = Scripted::new("survivor", Behavior::Accept);
    let victim = h.policies.load(victim).unwrap();
    let survivor = h.policies.load(survivor).unwrap();
    *evictor.target.lock() = Some(victim);

    let report = h.dispatcher.execute(WorkItem::framework(FrameworkEvent::GetStatus));

    assert_eq!(report.delivered, vec![e, survivor]);
    assert_eq!(report.skipped, vec![victim]);
    assert!(victim_seen.lock().is_empty());
    assert_eq!(survivor_seen.lock().len(), 1);

    // Break the Arc cycle between the evictor and the manager.
    h.policies.unload_all();
}

#[test]
fn destroy_notification_precedes_removal() {
    let h = harness();
    let seen = Seen::default();
    let p = h.participants.create(battery("p0", Behavior::Accept, &seen)).unwrap().index();
    let (policy, policy_seen) = Scripted::new("active", Behavior::Accept);
    h.policies.load(policy).unwrap();

    let report = h.dispatcher.execute(WorkItem::new(FrameworkEvent::ParticipantDestroy, p));

    assert_eq!(report.participant, ParticipantOutcome::Handled);
    assert_eq!(policy_seen.lock()[0].event, FrameworkEvent::ParticipantDestroy);
    assert!(h.participants.get(p).unwrap_err().is_invalid_index());

    let report = h.dispatcher.execute(WorkItem::new(FrameworkEvent::ParticipantDestroy, p));
    assert_eq!(report.participant, ParticipantOutcome::InvalidIndex);
}

proptest! {
    #[test]
    fn exactly_the_faulting_policy_is_reported(n in 1usize..8, k in 0usize..8, panics in any::<bool>()) {
        let k = k % n;
        let h = harness();
        let mut indexes = Vec::new();
        let mut logs = Vec::new();
        for i in 0..n {
            let behavior = match (i == k, panics) {
                (false, _) => Behavior::Accept,
                (true, false) => Behavior::Fail,
                (true, true) => Behavior::Panic,
            };
            let (policy, seen) = Scripted::new(format!("policy-{i}"), behavior);
            indexes.push(h.policies.load(policy).unwrap());
            logs.push(seen);
        }

        let report = h.dispatcher.execute(WorkItem::new(ParticipantEvent::ConnectedStandbyEntry, ParticipantIndex::new(0)));

        let expected: Vec<_> = indexes.iter().copied().enumerate().filter(|(i, _)| *i != k).map(|(_, p)| p).collect();
        prop_assert_eq!(&report.delivered, &expected);
        prop_assert_eq!(&report.faulted, &vec![indexes[k]]);
        prop_assert!(logs.iter().all(|log| log.lock().len() == 1));
    }
}
