//! # CLI Argument Definitions

use anyhow::{Context, bail};
use clap::Parser;
use ptf::domain::{DomainIndex, ParticipantIndex};
use ptf::events::ParticipantEvent;
use ptf::manager::WorkItem;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "ptf-daemon")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Runs the platform thermal framework against a configured platform")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to `ptf.*` in the
    /// working directory when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Event to dispatch, as `NAME@PARTICIPANT[:DOMAIN]`. `NAME` is a
    /// participant event name or its numeric tag. Repeatable; dispatched in order.
    #[arg(short, long = "event", value_name = "EVENT")]
    pub events: Vec<EventArg>,

    /// Enable activity logging on every participant before dispatching events.
    #[arg(long)]
    pub activity: bool,
}

/// A work item given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventArg(pub WorkItem);

impl FromStr for EventArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, target)) = s.trim().split_once('@') else {
            bail!("expected NAME@PARTICIPANT[:DOMAIN], got '{s}'");
        };

        let event = match name.parse::<u32>() {
            Ok(tag) => ParticipantEvent::from_tag(tag)?,
            Err(_) => name.parse::<ParticipantEvent>()?,
        };

        let (participant, domain) = match target.split_once(':') {
            Some((p, d)) => (p, Some(d)),
            None => (target, None),
        };
        let participant =
            ParticipantIndex::new(participant.parse().with_context(|| format!("participant index in '{s}'"))?);

        Ok(Self(match domain {
            Some(d) => {
                let domain = DomainIndex::new(d.parse().with_context(|| format!("domain index in '{s}'"))?);
                WorkItem::for_domain(event, participant, domain)
            },
            None => WorkItem::new(event, participant),
        }))
    }
}
