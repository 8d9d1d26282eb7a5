//! Summary statistics over per-generation fitness samples.
//!
//! # Examples
//!
//! ```
//! use neuroflap_stats::descriptive::DescriptiveStats;
//!
//! let fitness = [0.0, 1.0, 4.0, 9.0];
//! let stats = DescriptiveStats::new(fitness).unwrap();
//! assert_eq!(stats.max, 9.0);
//! assert_eq!(stats.total, 14.0);
//! ```

pub mod descriptive;
