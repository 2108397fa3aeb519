use crate::infra::{EventStore, InMemoryEventRepository};
use chrono::Utc;
use clap::Args;
use hiperfarma_meeting::config::{AppConfig, DrawConfig};
use hiperfarma_meeting::error::AppError;
use hiperfarma_meeting::meeting::seed::mock_snapshot;
use hiperfarma_meeting::meeting::{
    MeetingService, MeetingServiceError, PendingDraw, StoreProgress, SweepstakeDrawEngine,
    TierOverview,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seed the random source so a demo run can be replayed.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Play the spin preview in real time instead of printing it at once.
    #[arg(long)]
    pub(crate) animate: bool,
    /// Duration of the spin preview in milliseconds.
    #[arg(long, default_value_t = 1500)]
    pub(crate) preview_ms: u64,
}

#[derive(Args, Debug, Default)]
pub(crate) struct EligibilityArgs {
    /// JSON snapshot file to read (defaults to APP_DATA_FILE).
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
    /// Also list every store's position on the tier ladder.
    #[arg(long)]
    pub(crate) progress: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let draw_config = DrawConfig {
        preview_duration_ms: args.preview_ms,
        ..DrawConfig::default()
    };
    let engine = SweepstakeDrawEngine::from_config(&draw_config);
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let service = MeetingService::with_rng(
        Arc::new(InMemoryEventRepository::default()),
        engine,
        rng,
    );
    service.seed_if_empty(mock_snapshot(Utc::now()))?;

    println!("Hiperfarma business meeting demo");
    let overview = service.eligibility()?;
    render_eligibility(&overview);

    for line in &overview {
        println!("\nSorteio: {} ({})", line.tier.name, line.tier.reward_name);
        loop {
            match service.draw(&line.tier.id) {
                Ok(pending) => {
                    render_preview(&pending, args.animate, &draw_config);
                    let record = service.confirm_draw(&pending.tier_id, &pending.store.id)?;
                    println!(
                        "  Winner: {} -> {} ({} left)",
                        record.store_description,
                        record.reward_name,
                        pending.remaining_slots - 1
                    );
                }
                Err(MeetingServiceError::Draw(reason)) => {
                    println!("  No prize remaining or no eligible store ({reason})");
                    break;
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    let winners = service.winners()?;
    println!("\nWinner log ({} records)", winners.len());
    for record in winners {
        println!(
            "- [{}] {} | {} | {}",
            record.id, record.tier_name, record.store_description, record.reward_name
        );
    }

    Ok(())
}

pub(crate) fn run_eligibility_report(args: EligibilityArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(data_file) = args.data_file {
        config.storage.data_file = Some(data_file);
    }

    let repository = EventStore::from_config(&config.storage);
    let storage = repository.describe();
    let service = MeetingService::new(
        Arc::new(repository),
        SweepstakeDrawEngine::from_config(&config.draw),
    );

    println!("Event source: {storage}");
    render_eligibility(&service.eligibility()?);

    if args.progress {
        println!("\nTier progress");
        let snapshot = service.snapshot()?;
        for store in &snapshot.stores {
            let progress = service.store_progress(&store.id)?;
            println!("- {}: {}", store.description(), describe_progress(&progress));
        }
    }

    Ok(())
}

fn render_eligibility(overview: &[TierOverview]) {
    if overview.is_empty() {
        println!("\nNo award tiers configured");
        return;
    }

    println!("\nEligibility by tier");
    for line in overview {
        let thresholds = match line.tier.thresholds.secondary {
            Some(secondary) => format!("PR {} / SC {}", line.tier.thresholds.primary, secondary),
            None => format!("PR {}", line.tier.thresholds.primary),
        };
        println!(
            "- {} [{}]: {} of {} prize(s) left, {} eligible store(s)",
            line.tier.name,
            thresholds,
            line.remaining_slots.max(0),
            line.tier.quantity_available,
            line.eligible_stores.len()
        );
        for store in &line.eligible_stores {
            println!("    {} ({} selos)", store.description(), store.positivation_count());
        }
    }
}

fn render_preview(pending: &PendingDraw, animate: bool, config: &DrawConfig) {
    if animate {
        for name in &pending.preview {
            println!("  ... {name}");
            thread::sleep(Duration::from_millis(config.preview_interval_ms));
        }
    } else if let Some(last) = pending.preview.last() {
        println!(
            "  Spinning through {} name(s) from a pool of {}, last shown: {}",
            pending.preview.len(),
            pending.pool_size,
            last
        );
    }
}

fn describe_progress(progress: &StoreProgress) -> String {
    let achieved = progress
        .achieved
        .as_ref()
        .map(|tier| tier.tier_name.clone())
        .unwrap_or_else(|| "no tier yet".to_string());
    match &progress.next {
        Some(next) => format!(
            "{} selos, {achieved}; {} more for {}",
            progress.positivations, next.missing, next.tier_name
        ),
        None => format!("{} selos, {achieved}; top tier reached", progress.positivations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_every_tier_to_exhaustion() {
        run_demo(DemoArgs {
            seed: Some(11),
            animate: false,
            preview_ms: 100,
        })
        .expect("demo completes");
    }

    #[test]
    fn progress_description_mentions_missing_selos() {
        let snapshot = mock_snapshot(Utc::now());
        let store = snapshot
            .stores
            .iter()
            .find(|store| store.code == "1003")
            .expect("seeded store present");
        let progress = hiperfarma_meeting::meeting::store_progress(store, &snapshot.tiers);
        let text = describe_progress(&progress);
        assert!(text.starts_with("3 selos, Bronze"), "{text}");
        assert!(text.contains("2 more for Prata"), "{text}");
    }
}
