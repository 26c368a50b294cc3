//! In-memory scenario runner: one full review round, end to end.
//!
//! Wires the real workflows to in-memory adapters, walks a panel of readers
//! through voting and submission, compiles, and prints the resulting
//! determinations. Useful as a smoke check of the whole engine and as a demo
//! of the workflow order.

use anyhow::Result;
use std::sync::Arc;

use accord_application::ports::catalog::SpecificationCatalog;
use accord_application::ports::notifier::Notifier;
use accord_application::{
    AssessmentWorkflow, CompilationWorkflow, LockWorkflow,
};
use accord_domain::{
    ActorId, CompilationSummary, FinalRecommendation, IdentityContext, RecommendationCategory,
    Role, SpecItemKey, Submission, SubmissionId, VoteValue,
};
use accord_infrastructure::{FanoutNotifier, FileConfig, InMemoryStore, JsonlNotifier, TracingNotifier};

/// Deterministic vote script: every reader finds the submission compliant,
/// except the last reader, who grades every third item non-compliant. This
/// guarantees both unanimous items and disagreements to compile.
fn scripted_vote(reader_index: usize, panel_size: usize, item_index: usize) -> VoteValue {
    if reader_index == panel_size - 1 && item_index % 3 == 2 {
        VoteValue::NonCompliant
    } else {
        VoteValue::Compliant
    }
}

fn notifier_from_config(config: &FileConfig) -> Arc<dyn Notifier> {
    let mut sinks: Vec<Arc<dyn Notifier>> = vec![Arc::new(TracingNotifier)];
    if config.audit.enabled {
        if let Some(path) = &config.audit.log_path {
            if let Some(jsonl) = JsonlNotifier::new(path) {
                sinks.push(Arc::new(jsonl));
            }
        }
    }
    Arc::new(FanoutNotifier::new(sinks))
}

pub async fn run(
    config: &FileConfig,
    catalog: Arc<dyn SpecificationCatalog>,
    panel_size: usize,
) -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let notifier = notifier_from_config(config);

    let submission_id = SubmissionId::new("sub-demo");
    store.insert_submission(Submission::new(
        submission_id.clone(),
        "author-1",
        "Demo Self-Study Report",
    ))?;

    let assessments = AssessmentWorkflow::new(
        store.clone(),
        store.clone(),
        catalog.clone(),
        notifier.clone(),
    );
    let locks = LockWorkflow::new(store.clone(), notifier.clone());
    let compilations = CompilationWorkflow::new(
        store.clone(),
        store.clone(),
        catalog.clone(),
        notifier.clone(),
    );

    let coordinator = IdentityContext::new("coordinator-1", Role::Coordinator);
    let keys: Vec<SpecItemKey> = catalog.keys();

    println!("Panel of {} readers, {} specification items", panel_size, keys.len());
    println!();

    // Each reader reviews under the edit lock, votes, and submits
    for reader_index in 0..panel_size {
        let reader_id = format!("reader-{}", reader_index + 1);
        let actor = ActorId::new(reader_id.clone());
        let identity = IdentityContext::new(reader_id.clone(), Role::Reader)
            .with_assignment(submission_id.clone());

        assessments
            .assign(&coordinator, &submission_id, actor.clone())
            .await?;
        locks.acquire(&identity, &submission_id).await?;

        for (item_index, key) in keys.iter().enumerate() {
            let value = scripted_vote(reader_index, panel_size, item_index);
            assessments
                .record_vote(&identity, &submission_id, &actor, key, value, "scenario vote")
                .await?;
        }

        assessments
            .set_recommendation(
                &identity,
                &submission_id,
                &actor,
                FinalRecommendation::new(
                    "Coherent self-study with solid evidence.",
                    "Closing-the-loop documentation is thin.",
                    RecommendationCategory::Accredit,
                ),
            )
            .await?;

        locks.release(&identity, &submission_id).await?;
        let assessment = assessments.submit(&identity, &submission_id, &actor).await?;
        let progress = assessment.progress();
        println!(
            "{} submitted: {}/{} items reviewed ({} non-compliant)",
            reader_id, progress.reviewed, progress.total, progress.non_compliant
        );
    }

    // Lead reader compiles the panel
    let lead = IdentityContext::new("lead-1", Role::LeadReader)
        .with_assignment(submission_id.clone());
    compilations.create_or_load(&lead, &submission_id).await?;
    compilations.aggregate(&lead, &submission_id).await?;

    let disagreements = compilations.disagreements(&submission_id).await?;
    println!();
    println!("Disagreements: {}", disagreements.len());
    for item in &disagreements {
        println!(
            "  {:<10} {} compliant / {} non-compliant -> consensus {}",
            item.item.to_string(),
            item.counts.compliant,
            item.counts.non_compliant,
            item.consensus.map(|v| v.to_string()).unwrap_or_default()
        );
    }

    let adopted = compilations.adopt_consensus(&lead, &submission_id).await?;
    compilations
        .set_summary(
            &lead,
            &submission_id,
            CompilationSummary {
                strengths: "Readers converged on most specifications.".to_string(),
                weaknesses: "Split votes concentrated in outcome assessment.".to_string(),
                overall: Some(RecommendationCategory::Accredit),
            },
        )
        .await?;
    let compiled = compilations.submit(&lead, &submission_id).await?;

    let stats = compiled.statistics();
    println!();
    println!("Compilation submitted ({} determinations adopted from consensus)", adopted);
    println!(
        "  {} items: {} compliant, {} non-compliant, {} not applicable",
        stats.total, stats.compliant, stats.non_compliant, stats.not_applicable
    );
    println!("  compliance rate: {:.1}%", stats.compliance_rate * 100.0);

    Ok(())
}
