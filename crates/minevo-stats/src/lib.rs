//! Statistical summaries used by the training reports.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use minevo_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use minevo_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```

pub mod descriptive;
pub mod percentiles;
