//! `chainevents events`: list the contract event catalog.

use anyhow::Result;
use chainevents_bindings::{catalog, Contract};

pub fn run(contract: Option<Contract>, as_json: bool) -> Result<()> {
    let events = match contract {
        Some(contract) => contract.events(),
        None => catalog(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    for info in &events {
        println!(
            "{:14} {:34} indexed={} {}",
            info.contract, info.name, info.indexed, info.topic
        );
        println!("{:14} {}", "", info.signature);
    }
    println!("\n{} events", events.len());
    Ok(())
}
