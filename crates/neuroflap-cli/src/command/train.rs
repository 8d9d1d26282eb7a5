use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use neuroflap_engine::World;
use neuroflap_training::GenerationSummary;

use crate::{
    command::ConfigArg,
    schema::report::{GenerationRecord, TrainingReport},
    util::Output,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Number of generations to run
    #[arg(long, default_value_t = 50)]
    generations: usize,
    /// Write a JSON training report to this file (`-` for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        generations,
        output,
    } = arg;
    let config = config.load()?;

    let started_at = Utc::now();
    let mut world = World::new(config.clone()).context("Failed to create world")?;
    let mut records = Vec::with_capacity(*generations);
    for _ in 0..*generations {
        let summary = world
            .run_generation()
            .with_context(|| format!("Failed to run generation #{}", world.generation()))?;
        print_generation(&summary, world.max_ticks());
        records.push(GenerationRecord::from(&summary));
    }
    let finished_at = Utc::now();

    let best_fitness = world.genetic_algorithm().best_fitness();
    eprintln!("Training finished:");
    eprintln!("  Generations:  {}", records.len());
    eprintln!(
        "  Best score:   {}",
        records.iter().map(|r| r.best_score).max().unwrap_or(0)
    );
    eprintln!("  Best fitness: {:.1}", best_fitness.unwrap_or(0.0));
    eprintln!(
        "  Elapsed:      {} ms",
        (finished_at - started_at).num_milliseconds()
    );

    if let Some(output) = output {
        let report = TrainingReport {
            started_at,
            finished_at,
            config,
            best_fitness,
            generations: records,
        };
        Output::save_json(&report, output)?;
    }
    Ok(())
}

fn print_generation(summary: &GenerationSummary, max_ticks: u64) {
    let stats = &summary.fitness;
    eprintln!("Generation #{}:", summary.generation);
    eprintln!("  Alive at end: {}", summary.alive);
    eprintln!(
        "  Best:         #{} score {}/{} fitness {:.1}",
        summary.best_index, summary.best_score, max_ticks, summary.best_fitness
    );
    eprintln!("  Fitness Stats:");
    eprintln!("    Min:    {:.1}", stats.min);
    eprintln!("    Max:    {:.1}", stats.max);
    eprintln!("    Mean:   {:.1}", stats.mean);
    eprintln!("    Median: {:.1}", stats.median);
}
