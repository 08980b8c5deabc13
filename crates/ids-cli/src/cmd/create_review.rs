use crate::output::{print_json, rule};
use anyhow::Context;
use ids_core::{
    types::ReviewStatus, FileRegistry, IncrementalDecisionEngine, RegistryLoader, ReviewReport,
};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let registry = FileRegistry::new(root)
        .load()
        .context("failed to load registry")?;
    let report = IncrementalDecisionEngine::new(&registry, config).review_create_decisions();

    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &ReviewReport) {
    println!("\nIDS CREATE decision review");
    println!("{}", rule());
    println!("CREATE justifications reviewed: {}", report.total_reviewed);

    if report.total_reviewed == 0 {
        println!("\nNo CREATE justifications recorded yet.");
        println!("They are recorded whenever `ids query` concludes CREATE.");
        println!();
        return;
    }

    for (title, status) in [
        ("Pending review", ReviewStatus::PendingReview),
        ("Promotion candidates", ReviewStatus::PromotionCandidate),
        ("Deprecation review", ReviewStatus::DeprecationReview),
        ("Monitoring", ReviewStatus::Monitoring),
    ] {
        let entries = report.bucket(status);
        if entries.is_empty() {
            continue;
        }
        println!("\n{title} ({}):", entries.len());
        for e in entries {
            println!(
                "  {} - reused {}x - review {} - status: {}",
                e.entity_id,
                e.reusage_count,
                e.review_scheduled.format("%Y-%m-%d"),
                e.status
            );
        }
    }
    println!();
}
