use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Maximum multinomial redraw attempts before falling back to floor
/// substitution.
pub const MAX_REDRAW_ATTEMPTS: u32 = 10;

/// Depth forced into residual zero-depth cells after the redraw budget is
/// exhausted, applied only where the original depth was non-zero. This is a
/// deliberate floor substitution: it avoids degenerate zero-depth cells at
/// the cost of a small, bounded bias for samples with a low depth share
/// (a known, accepted approximation).
pub const FLOOR_DEPTH: u32 = 1;

/// Resampled draws for one mutation: `vafs[k][s]` and `depths[k][s]` hold the
/// values for sample `s` in bootstrap replicate `k`.
#[derive(Debug)]
pub struct ResampledDraws {
    pub vafs: Vec<Vec<f64>>,
    pub depths: Vec<Vec<u32>>,
}

/// Resample depths and VAFs for one mutation across its samples.
///
/// Depths are redrawn by multinomial resampling of the mutation's total depth
/// over the original per-sample depth proportions, so each replicate's depths
/// sum to the original total. Batches containing a zero-depth cell are redrawn
/// up to [`MAX_REDRAW_ATTEMPTS`] times, then residual zeros are floored (see
/// [`FLOOR_DEPTH`]). Variant counts are then redrawn per cell as
/// Binomial(resampled depth, original VAF); cells with depth 0 get VAF 0.
///
/// A mutation whose depths are all zero short-circuits: every replicate gets
/// all-zero depths and VAFs, with no sampling at all. Never fails for valid
/// numeric input.
pub fn resample_mutation<R: Rng>(
    vafs: &[f64],
    depths: &[u32],
    replicates: usize,
    rng: &mut R,
) -> ResampledDraws {
    debug_assert_eq!(vafs.len(), depths.len());
    let n_samples = depths.len();
    let total_depth: u64 = depths.iter().map(|&d| u64::from(d)).sum();

    let depth_draws: Vec<Vec<u32>> = if total_depth == 0 {
        vec![vec![0; n_samples]; replicates]
    } else {
        let pvals: Vec<f64> = depths
            .iter()
            .map(|&d| d as f64 / total_depth as f64)
            .collect();
        resample_depths(total_depth, &pvals, depths, replicates, rng)
    };

    let vaf_draws: Vec<Vec<f64>> = depth_draws
        .iter()
        .map(|draw| {
            draw.iter()
                .enumerate()
                .map(|(s, &d)| {
                    if d == 0 {
                        0.0
                    } else {
                        let variant_reads = binomial(u64::from(d), vafs[s], rng);
                        variant_reads as f64 / f64::from(d)
                    }
                })
                .collect()
        })
        .collect();

    ResampledDraws {
        vafs: vaf_draws,
        depths: depth_draws,
    }
}

/// Rejection-sampling loop around the batched multinomial draw.
///
/// The whole batch is redrawn whenever any cell is zero; after the attempt
/// budget is spent, zeros are floored where the original depth was non-zero.
/// Samples whose original depth was legitimately zero stay zero (their
/// multinomial probability is zero, so every batch re-triggers the redraw and
/// the loop always runs to the attempt cap for such mutations).
fn resample_depths<R: Rng>(
    total_depth: u64,
    pvals: &[f64],
    original_depths: &[u32],
    replicates: usize,
    rng: &mut R,
) -> Vec<Vec<u32>> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let batch: Vec<Vec<u32>> = (0..replicates)
            .map(|_| multinomial(total_depth, pvals, rng))
            .collect();

        let has_zero = batch.iter().any(|draw| draw.iter().any(|&d| d == 0));
        if !has_zero {
            return batch;
        }
        if attempt >= MAX_REDRAW_ATTEMPTS {
            let mut batch = batch;
            for draw in &mut batch {
                for (s, d) in draw.iter_mut().enumerate() {
                    if *d == 0 && original_depths[s] > 0 {
                        *d = FLOOR_DEPTH;
                    }
                }
            }
            return batch;
        }
    }
}

/// Multinomial sampling by sequential binomial conditioning: category `i`
/// receives Binomial(remaining, p_i / remaining_mass) draws, and the last
/// category absorbs whatever is left, so the draw always sums to `n` exactly.
fn multinomial<R: Rng>(n: u64, pvals: &[f64], rng: &mut R) -> Vec<u32> {
    let mut draw = vec![0u32; pvals.len()];
    let mut remaining = n;
    let mut remaining_mass = 1.0f64;

    for (i, &p) in pvals.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        if i == pvals.len() - 1 {
            draw[i] = remaining as u32;
            break;
        }
        let cond = if remaining_mass > 0.0 {
            (p / remaining_mass).min(1.0)
        } else {
            1.0
        };
        let x = binomial(remaining, cond, rng);
        draw[i] = x as u32;
        remaining -= x;
        remaining_mass -= p;
    }

    draw
}

fn binomial<R: Rng>(n: u64, p: f64, rng: &mut R) -> u64 {
    // p is a probability by construction (VAF or conditional depth share)
    let p = p.clamp(0.0, 1.0);
    Binomial::new(n, p)
        .expect("binomial probability within [0, 1]")
        .sample(rng)
}
