use crate::output::{percent, print_json, rule};
use anyhow::Context;
use ids_core::{
    types::EntityType, AnalysisResult, FileRegistry, IncrementalDecisionEngine, QueryFilters,
    Recommendation, RegistryLoader,
};
use std::path::Path;

pub fn run(
    root: &Path,
    intent: &[String],
    entity_type: Option<&str>,
    category: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let intent = intent.join(" ");
    let intent = intent.trim();
    if intent.is_empty() {
        anyhow::bail!("intent is required: ids query \"your intent here\"");
    }
    let entity_type = entity_type
        .map(str::parse::<EntityType>)
        .transpose()?;

    let config = super::load_config(root)?;
    let store = FileRegistry::new(root);
    let registry = store.load().context("failed to load registry")?;

    let engine = IncrementalDecisionEngine::new(&registry, config).with_store(&store);
    let result = engine.analyze(intent, &QueryFilters::new(entity_type, category));

    if json {
        return print_json(&result);
    }
    print_analysis(intent, &result);
    Ok(())
}

fn print_analysis(intent: &str, result: &AnalysisResult) {
    println!("\nIDS analysis: \"{intent}\"");
    println!("{}", rule());
    println!(
        "Registry: {} entities | Matches: {}",
        result.summary.total_entities, result.summary.matches_found
    );
    println!(
        "Decision: {} ({} confidence)",
        result.summary.decision, result.summary.confidence
    );
    for w in &result.warnings {
        println!("warning: {w}");
    }

    println!("\nRationale: {}", result.rationale);

    if !result.recommendations.is_empty() {
        println!("\nRecommendations:");
        for (i, rec) in result.recommendations.iter().enumerate() {
            print_recommendation(i, rec);
        }
    }

    if let Some(j) = &result.justification {
        println!("\nCREATE justification:");
        let evaluated = if j.evaluated_patterns.is_empty() {
            "none".to_string()
        } else {
            j.evaluated_patterns.join(", ")
        };
        println!("  Evaluated: {evaluated}");
        if !j.rejection_reasons.is_empty() {
            println!("  Rejections:");
            for (id, reason) in &j.rejection_reasons {
                println!("    - {id}: {reason}");
            }
        }
        println!("  New capability: {}", j.new_capability);
        println!(
            "  Review scheduled: {}",
            j.review_scheduled.format("%Y-%m-%d")
        );
    }
    println!();
}

fn print_recommendation(index: usize, rec: &Recommendation) {
    println!(
        "  {}. {} ({}) {}",
        index + 1,
        rec.decision,
        rec.confidence,
        rec.entity_id
    );
    println!("     Path: {}", rec.entity_path);
    println!(
        "     Type: {} | Relevance: {}",
        rec.entity_type,
        percent(rec.relevance_score)
    );
    println!("     {}", rec.rationale);
    if let Some(impact) = &rec.adaptation_impact {
        println!(
            "     Impact: {} direct, {} indirect consumers",
            impact.direct_count, impact.indirect_count
        );
    }
}
