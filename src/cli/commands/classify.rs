//! Score-type classification of a single fragment, for drift triage.

use console::style;

use crate::cli::icons::{dim_arrow, warn};
use crate::scrapers::wodwell::classify;

pub fn cmd_classify(fragment: &str) -> anyhow::Result<()> {
    let result = classify(fragment);

    let flag = |set: bool| {
        if set {
            style("yes").green()
        } else {
            style("no").dim()
        }
    };

    println!("{}", style("Score types").bold());
    println!("  {} For Load: {}", dim_arrow(), flag(result.facets.load));
    println!("  {} For Time: {}", dim_arrow(), flag(result.facets.time));
    println!(
        "  {} For Rounds/Reps (AMRAP): {}",
        dim_arrow(),
        flag(result.facets.rounds_reps)
    );

    for label in &result.unknown_labels {
        println!("{} Unrecognized label: {:?}", warn(), label);
    }
    if let Some(detail) = result.malformed {
        println!("{} Malformed fragment: {}", warn(), detail);
    }

    Ok(())
}
