//! Probe command - print the generation token of a live process.

use anyhow::Result;
use killonstart_core::SignalTerminator;

pub async fn run(pid: u32, json: bool) -> Result<()> {
    let generation = SignalTerminator::new().generation_of(pid).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "pid": pid, "generation": generation })
        );
        return Ok(());
    }

    match generation {
        Some(generation) => println!("{} {}", pid, generation),
        None => println!("Process {} is not running", pid),
    }
    Ok(())
}
