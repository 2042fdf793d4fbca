//! Turning `--contract/--event/--address/--topic` flags into `FilterCriteria`.

use alloy_primitives::{Address, B256};
use anyhow::{anyhow, bail, Context, Result};
use chainevents_bindings::Contract;
use chainevents_core::{FilterCriteria, TopicSet};
use clap::Args;
use std::str::FromStr;

/// `<pos>=<hex>`: constrain the indexed field at 1-based position `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicArg {
    pub position: usize,
    pub value: B256,
}

impl FromStr for TopicArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (pos, value) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected <pos>=<hex>, got '{s}'"))?;
        let position: usize = pos.trim().parse().with_context(|| format!("topic position '{pos}'"))?;
        if position == 0 {
            bail!("topic positions start at 1 (topic 0 is the event signature)");
        }
        Ok(Self {
            position,
            value: parse_topic(value.trim())?,
        })
    }
}

/// A full 32-byte topic, or a 20-byte address left-padded into one.
fn parse_topic(value: &str) -> Result<B256> {
    if let Ok(topic) = value.parse::<B256>() {
        return Ok(topic);
    }
    let address: Address = value
        .parse()
        .with_context(|| format!("'{value}' is neither a 32-byte topic nor an address"))?;
    Ok(address.into_word())
}

#[derive(Debug, Clone, Args)]
pub struct Selection {
    /// Contract binding, e.g. ETHDKG, ValidatorPool, ALCA
    #[arg(long)]
    pub contract: Contract,
    /// Single event of the contract (default: every event it emits)
    #[arg(long)]
    pub event: Option<String>,
    /// Emitting address (default: the contract's address from the config file)
    #[arg(long)]
    pub address: Option<Address>,
    /// Indexed field filter, repeatable: --topic 1=0xabc... (requires --event)
    #[arg(long = "topic", value_name = "POS=HEX")]
    pub topics: Vec<TopicArg>,
}

impl Selection {
    /// Criteria over the default (historical, from genesis) range.
    pub fn criteria(&self, configured: &[Address]) -> Result<FilterCriteria> {
        let criteria = match &self.event {
            None => {
                if !self.topics.is_empty() {
                    bail!("--topic needs --event: indexed positions differ between events");
                }
                self.contract.criteria()
            }
            Some(name) => {
                let info = self.contract.event(name).ok_or_else(|| {
                    anyhow!("{} has no event named '{name}'", self.contract)
                })?;
                let mut indexed = vec![TopicSet::any(); info.indexed];
                for topic in &self.topics {
                    let slot = indexed.get_mut(topic.position - 1).ok_or_else(|| {
                        anyhow!(
                            "{} has {} indexed fields, --topic {} is out of range",
                            info.signature,
                            info.indexed,
                            topic.position
                        )
                    })?;
                    let mut values = slot.values().to_vec();
                    values.push(topic.value);
                    *slot = TopicSet::of(values);
                }
                FilterCriteria::new(info.name, info.topic, info.indexed, indexed)?
            }
        };

        let addresses: Vec<Address> = match self.address {
            Some(address) => vec![address],
            None => configured.to_vec(),
        };
        if addresses.is_empty() {
            tracing::warn!(contract = %self.contract, "no address configured, matching any emitter");
        }
        Ok(criteria.with_addresses(addresses))
    }
}
