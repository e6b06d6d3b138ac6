use crate::types::MutationRecord;
use anyhow::{bail, Result};

/// Mutations with any valid sample at or above this VAF are removed
/// ("any-high" policy): VAFs that high are far likelier to be germline
/// variants or artifacts than subclonal somatic mutations.
pub const VAF_PREFILTER_THRESHOLD: f64 = 0.9;

/// Minimum surviving mutation count for a meaningful phylogenetic bootstrap.
pub const MIN_MUTATIONS: usize = 5;

/// Outcome of VAF prefiltering. Survivor order matches input order.
pub struct PrefilterOutcome {
    pub retained: Vec<MutationRecord>,
    pub removed: usize,
}

/// Apply VAF prefiltering at `threshold`.
///
/// A mutation survives when every valid sample has VAF < threshold; one
/// disqualifying sample removes the whole mutation. Samples with `depth == 0`
/// have VAF 0 and always pass. Mutations with zero valid samples are dropped.
pub fn apply_vaf_prefilter(records: Vec<MutationRecord>, threshold: f64) -> PrefilterOutcome {
    let total = records.len();
    let mut retained = Vec::with_capacity(total);

    for rec in records {
        let mut any_valid = false;
        let mut any_high = false;
        for i in 0..rec.n_samples() {
            if !rec.is_valid_sample(i) {
                continue;
            }
            any_valid = true;
            if rec.vaf(i) >= threshold {
                any_high = true;
                break;
            }
        }
        if any_valid && !any_high {
            retained.push(rec);
        }
    }

    let removed = total - retained.len();
    PrefilterOutcome { retained, removed }
}

/// Quality gate on the post-prefilter mutation count.
///
/// Below [`MIN_MUTATIONS`] the downstream phylogeny inference is statistically
/// meaningless and the bootstrap variance estimates are unusable, so the run
/// fails fatally rather than producing poor-quality results.
pub fn check_minimum_mutations(count: usize) -> Result<()> {
    if count == 0 {
        bail!("All mutations were filtered out by VAF pre-filtering. Check input data quality.");
    }
    if count < MIN_MUTATIONS {
        bail!(
            "After VAF filtering, only {} mutations remain; at least {} are required for \
             meaningful phylogenetic analysis. This typically indicates input data with too \
             many high-VAF mutations (likely artifacts), a sample with very few somatic \
             mutations, or a filtering threshold too strict for this dataset.",
            count,
            MIN_MUTATIONS
        );
    }
    Ok(())
}
