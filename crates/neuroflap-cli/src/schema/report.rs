use chrono::{DateTime, Utc};
use neuroflap_engine::SimulationConfig;
use neuroflap_training::GenerationSummary;
use serde::{Deserialize, Serialize};

/// Statistics of a training run. Trained network parameters are not included.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: SimulationConfig,
    pub best_fitness: Option<f32>,
    pub generations: Vec<GenerationRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_index: usize,
    pub best_score: u32,
    pub best_fitness: f32,
    pub alive: usize,
    pub fitness: FitnessStats,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FitnessStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
    pub total: f32,
}

impl From<&GenerationSummary> for GenerationRecord {
    fn from(summary: &GenerationSummary) -> Self {
        let stats = &summary.fitness;
        Self {
            generation: summary.generation,
            best_index: summary.best_index,
            best_score: summary.best_score,
            best_fitness: summary.best_fitness,
            alive: summary.alive,
            fitness: FitnessStats {
                min: stats.min,
                max: stats.max,
                mean: stats.mean,
                median: stats.median,
                std_dev: stats.std_dev,
                total: stats.total,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use neuroflap_stats::descriptive::DescriptiveStats;

    use super::*;

    #[test]
    fn test_record_from_summary() {
        let summary = GenerationSummary {
            generation: 3,
            best_index: 1,
            best_score: 12,
            best_fitness: 144.0,
            alive: 0,
            fitness: DescriptiveStats::new([0.0, 144.0, 16.0]).unwrap(),
        };
        let record = GenerationRecord::from(&summary);
        assert_eq!(record.generation, 3);
        assert_eq!(record.fitness.max, 144.0);
        assert_eq!(record.fitness.median, 16.0);
        assert_eq!(record.fitness.total, 160.0);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["best_score"], 12);
        assert_eq!(json["fitness"]["min"], 0.0);
    }

    #[test]
    fn test_report_serializes_timestamps_and_config() {
        let now = Utc::now();
        let report = TrainingReport {
            started_at: now,
            finished_at: now,
            config: SimulationConfig::default(),
            best_fitness: None,
            generations: vec![],
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: TrainingReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.started_at, now);
        assert_eq!(back.config, report.config);
        assert!(back.generations.is_empty());
    }
}
