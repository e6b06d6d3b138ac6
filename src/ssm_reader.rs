use crate::types::{CountEncoding, MutationRecord};
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Columns an SSM file must carry; any other columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = ["id", "gene", "a", "d", "mu_r", "mu_v"];

/// Read a tab-separated SSM file into mutation records.
///
/// The dual count encoding (bare integer vs comma-joined list) is normalized
/// here. Rows with unparseable counts or an `a`/`d` sample-count mismatch are
/// skipped with a warning; a missing file, missing required columns, or a
/// table with no data rows at all are fatal.
pub fn read_ssm(path: &Path) -> Result<Vec<MutationRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open SSM file: {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| col(c).is_none())
        .collect();
    if !missing.is_empty() {
        bail!(
            "Input SSM file is missing required columns: {}",
            missing.join(", ")
        );
    }

    let idx_id = col("id").unwrap();
    let idx_gene = col("gene").unwrap();
    let idx_a = col("a").unwrap();
    let idx_d = col("d").unwrap();
    let idx_mu_r = col("mu_r").unwrap();
    let idx_mu_v = col("mu_v").unwrap();

    let mut records = Vec::new();
    let mut raw_rows = 0usize;
    for (row, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read SSM row {}", row + 1))?;
        raw_rows += 1;

        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let id = field(idx_id);

        let (ref_counts, depths) = match (
            CountEncoding::parse(&field(idx_a)),
            CountEncoding::parse(&field(idx_d)),
        ) {
            (Some(a), Some(d)) => (a.into_counts(), d.into_counts()),
            _ => {
                eprintln!("Warning: could not parse 'a' or 'd' for mutation {}, skipping", id);
                continue;
            }
        };
        if ref_counts.len() != depths.len() {
            eprintln!(
                "Warning: sample count mismatch between 'a' and 'd' for mutation {}, skipping",
                id
            );
            continue;
        }

        let (mu_r, mu_v) = match (
            field(idx_mu_r).trim().parse::<f64>(),
            field(idx_mu_v).trim().parse::<f64>(),
        ) {
            (Ok(mu_r), Ok(mu_v)) => (mu_r, mu_v),
            _ => {
                eprintln!("Warning: could not parse 'mu_r' or 'mu_v' for mutation {}, skipping", id);
                continue;
            }
        };

        records.push(MutationRecord {
            id,
            gene: field(idx_gene),
            ref_counts,
            depths,
            mu_r,
            mu_v,
        });
    }

    if raw_rows == 0 {
        bail!("Input SSM file is empty: {}", path.display());
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ssm_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_single_and_multi_sample_rows() {
        let file = ssm_file(
            "id\tgene\ta\td\tmu_r\tmu_v\n\
             s0\tTP53\t10,5\t20,10\t0.999\t0.5\n\
             s1\tKRAS\t8\t16\t0.999\t0.5\n",
        );
        let records = read_ssm(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ref_counts, vec![10, 5]);
        assert_eq!(records[0].depths, vec![20, 10]);
        assert_eq!(records[1].ref_counts, vec![8]);
        assert_eq!(records[1].n_samples(), 1);
    }

    #[test]
    fn test_skips_malformed_rows() {
        let file = ssm_file(
            "id\tgene\ta\td\tmu_r\tmu_v\n\
             s0\tTP53\tten\t20\t0.999\t0.5\n\
             s1\tKRAS\t10,5\t20\t0.999\t0.5\n\
             s2\tEGFR\t8\t16\t0.999\t0.5\n",
        );
        let records = read_ssm(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "s2");
    }

    #[test]
    fn test_missing_columns_is_fatal() {
        let file = ssm_file("id\tgene\ta\n s0\tTP53\t10\n");
        let err = read_ssm(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let file = ssm_file("id\tgene\ta\td\tmu_r\tmu_v\n");
        let err = read_ssm(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(read_ssm(Path::new("/nonexistent/ssm.txt")).is_err());
    }
}
