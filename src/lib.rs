//! Bootstrap resampling of somatic-mutation read counts (SSM tables) to
//! quantify sampling uncertainty ahead of tumor-phylogeny reconstruction.
//!
//! The pipeline reads a tab-separated SSM table, removes implausibly high-VAF
//! mutations, enforces a minimum mutation count, then produces N independently
//! resampled copies of the table: per-mutation multinomial depth resampling
//! (total depth preserved) followed by per-sample binomial variant-count
//! resampling at the original VAF.

pub mod assemble;
pub mod output;
pub mod prefilter;
pub mod resample;
pub mod ssm_reader;
pub mod types;
