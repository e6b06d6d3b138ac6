use crate::resample::resample_mutation;
use crate::types::MutationRecord;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// One bootstrap replicate: a complete resampled mutation table.
pub type ReplicateTable = Vec<MutationRecord>;

/// Resample every mutation and regroup the draws into `replicates` complete
/// tables (replicate `k` holds every mutation's resampled record for
/// bootstrap index `k`).
///
/// Mutations are independent, so the per-mutation work runs in parallel with
/// an RNG substream derived from `seed` per mutation; output is deterministic
/// for a fixed seed regardless of thread count. Mutations with zero valid
/// samples are excluded from all replicates with a warning (prefiltering
/// already removed most malformed rows, so this re-check is defensive).
pub fn assemble_replicates(
    records: &[MutationRecord],
    replicates: usize,
    seed: u64,
    progress: Option<&ProgressBar>,
) -> Vec<ReplicateTable> {
    let per_mutation: Vec<Option<Vec<MutationRecord>>> = records
        .par_iter()
        .enumerate()
        .map(|(idx, rec)| {
            let rows = resample_record(rec, replicates, &mut mutation_rng(seed, idx));
            if let Some(pb) = progress {
                pb.inc(1);
            }
            rows
        })
        .collect();

    let mut tables: Vec<ReplicateTable> = vec![Vec::with_capacity(records.len()); replicates];
    for (rec, rows) in records.iter().zip(&per_mutation) {
        match rows {
            Some(rows) => {
                for (table, row) in tables.iter_mut().zip(rows) {
                    table.push(row.clone());
                }
            }
            None => eprintln!(
                "Warning: no valid samples for mutation {}, excluded from all replicates",
                rec.id
            ),
        }
    }
    tables
}

/// Resample one mutation into `replicates` output rows, or `None` when it has
/// no valid samples. Invalid samples (ref > depth) are dropped from the row.
fn resample_record(
    rec: &MutationRecord,
    replicates: usize,
    rng: &mut StdRng,
) -> Option<Vec<MutationRecord>> {
    let mut vafs = Vec::with_capacity(rec.n_samples());
    let mut depths = Vec::with_capacity(rec.n_samples());
    for i in 0..rec.n_samples() {
        if !rec.is_valid_sample(i) {
            continue;
        }
        vafs.push(rec.vaf(i));
        depths.push(rec.depths[i]);
    }
    if depths.is_empty() {
        return None;
    }

    let draws = resample_mutation(&vafs, &depths, replicates, rng);

    let rows = draws
        .depths
        .iter()
        .zip(&draws.vafs)
        .map(|(depths_k, vafs_k)| {
            let ref_counts = depths_k
                .iter()
                .zip(vafs_k)
                .map(|(&d, &vaf)| {
                    // Counts must be integers; clamp the rounded variant count
                    // to [0, depth] against rounding overshoot.
                    let variant = (vaf * f64::from(d)).round() as u32;
                    d - variant.min(d)
                })
                .collect();
            MutationRecord {
                id: rec.id.clone(),
                gene: rec.gene.clone(),
                ref_counts,
                depths: depths_k.clone(),
                mu_r: rec.mu_r,
                mu_v: rec.mu_v,
            }
        })
        .collect();
    Some(rows)
}

/// Independent per-mutation RNG substream (SplitMix64 mixing of seed and
/// mutation index, so neighboring indices decorrelate).
fn mutation_rng(seed: u64, idx: usize) -> StdRng {
    let mut z = seed.wrapping_add((idx as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}
