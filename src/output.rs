use crate::types::{CountEncoding, MutationRecord};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Fixed SSM column order, identical for the filtered table and every
/// replicate table.
pub const SSM_COLUMNS: [&str; 6] = ["id", "gene", "a", "d", "mu_r", "mu_v"];

/// Path for the persisted post-prefilter table: a sibling of the replicate
/// output root when it has a parent, otherwise inside the output directory
/// itself. Downstream marker selection reads this file.
pub fn filtered_ssm_path(output_dir: &Path) -> PathBuf {
    match output_dir.parent() {
        Some(parent) if parent != Path::new("") => parent.join("ssm_filtered.txt"),
        _ => output_dir.join("ssm_filtered.txt"),
    }
}

/// Write a mutation table as a tab-delimited SSM file.
///
/// Multi-sample counts are re-encoded as comma-joined strings, single-sample
/// counts as bare integers. An empty table still gets the header row.
pub fn write_ssm_table(records: &[MutationRecord], path: &Path) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create SSM file: {}", path.display()))?;

    wtr.write_record(SSM_COLUMNS)?;
    for rec in records {
        wtr.write_record([
            rec.id.clone(),
            rec.gene.clone(),
            CountEncoding::encode(&rec.ref_counts),
            CountEncoding::encode(&rec.depths),
            rec.mu_r.to_string(),
            rec.mu_v.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write bootstrap replicate `k` (1-based): `replicate-<k>/ssm.txt` plus the
/// empty `cnv.txt` placeholder the downstream phylogeny tool requires even
/// when no copy-number data exists.
pub fn write_replicate(records: &[MutationRecord], k: usize, output_dir: &Path) -> Result<()> {
    let dir = output_dir.join(format!("replicate-{}", k));
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create replicate directory: {}", dir.display()))?;

    write_ssm_table(records, &dir.join("ssm.txt"))?;

    File::create(dir.join("cnv.txt"))
        .with_context(|| format!("Failed to create CNV placeholder in {}", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, ref_counts: Vec<u32>, depths: Vec<u32>) -> MutationRecord {
        MutationRecord {
            id: id.to_string(),
            gene: "GENE".to_string(),
            ref_counts,
            depths,
            mu_r: 0.999,
            mu_v: 0.5,
        }
    }

    #[test]
    fn test_write_ssm_table_dual_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ssm.txt");
        let records = vec![
            record("s0", vec![10, 5], vec![20, 10]),
            record("s1", vec![8], vec![16]),
        ];
        write_ssm_table(&records, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "id\tgene\ta\td\tmu_r\tmu_v");
        assert_eq!(lines[1], "s0\tGENE\t10,5\t20,10\t0.999\t0.5");
        assert_eq!(lines[2], "s1\tGENE\t8\t16\t0.999\t0.5");
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ssm.txt");
        write_ssm_table(&[], &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), "id\tgene\ta\td\tmu_r\tmu_v");
    }

    #[test]
    fn test_write_replicate_layout() {
        let dir = TempDir::new().unwrap();
        let records = vec![record("s0", vec![10], vec![20])];
        write_replicate(&records, 3, dir.path()).unwrap();

        let rep_dir = dir.path().join("replicate-3");
        assert!(rep_dir.join("ssm.txt").is_file());
        let cnv = rep_dir.join("cnv.txt");
        assert!(cnv.is_file());
        assert_eq!(fs::metadata(&cnv).unwrap().len(), 0);
    }

    #[test]
    fn test_empty_replicate_still_written() {
        let dir = TempDir::new().unwrap();
        write_replicate(&[], 1, dir.path()).unwrap();
        assert!(dir.path().join("replicate-1").join("ssm.txt").is_file());
        assert!(dir.path().join("replicate-1").join("cnv.txt").is_file());
    }

    #[test]
    fn test_filtered_ssm_path_is_sibling_of_output_root() {
        assert_eq!(
            filtered_ssm_path(Path::new("/data/patient1/initial/bootstraps")),
            PathBuf::from("/data/patient1/initial/ssm_filtered.txt")
        );
        // No usable parent: falls back into the output directory
        assert_eq!(
            filtered_ssm_path(Path::new("bootstraps")),
            PathBuf::from("bootstraps/ssm_filtered.txt")
        );
    }
}
