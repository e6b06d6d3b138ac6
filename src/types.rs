/// A single somatic mutation (SSM row) with per-sample read-count evidence.
///
/// `ref_counts` and `depths` are aligned by sample index and always have the
/// same length after ingestion.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub id: String,
    /// Gene/variant label, either a bare symbol or `SYMBOL_CHR_POS_REF>ALT`.
    pub gene: String,
    /// Reference-supporting read count per sample.
    pub ref_counts: Vec<u32>,
    /// Total read depth per sample.
    pub depths: Vec<u32>,
    /// Error-rate parameters, carried through unchanged.
    pub mu_r: f64,
    pub mu_v: f64,
}

impl MutationRecord {
    pub fn n_samples(&self) -> usize {
        self.depths.len()
    }

    /// A sample is valid when its reference count does not exceed its depth.
    pub fn is_valid_sample(&self, i: usize) -> bool {
        self.ref_counts[i] <= self.depths[i]
    }

    /// Variant allele frequency of sample `i`.
    /// Zero-depth samples have VAF 0 by convention.
    pub fn vaf(&self, i: usize) -> f64 {
        let d = self.depths[i];
        if d == 0 {
            0.0
        } else {
            (d - self.ref_counts[i]) as f64 / d as f64
        }
    }
}

/// Textual encoding of the `a`/`d` columns: single-sample tables use a bare
/// integer, multi-sample tables a comma-joined list. Normalized to a plain
/// count vector immediately on ingestion; the dual form is restored only when
/// writing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountEncoding {
    Scalar(u32),
    MultiSample(Vec<u32>),
}

impl CountEncoding {
    /// Parse a count field. Returns `None` for empty fields or non-integer
    /// entries; callers treat that as a malformed row.
    pub fn parse(field: &str) -> Option<CountEncoding> {
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        if field.contains(',') {
            let counts: Option<Vec<u32>> = field
                .split(',')
                .map(|part| part.trim().parse::<u32>().ok())
                .collect();
            Some(CountEncoding::MultiSample(counts?))
        } else {
            Some(CountEncoding::Scalar(field.parse().ok()?))
        }
    }

    pub fn into_counts(self) -> Vec<u32> {
        match self {
            CountEncoding::Scalar(c) => vec![c],
            CountEncoding::MultiSample(cs) => cs,
        }
    }

    /// Encode a count vector back into the textual form: bare integer for a
    /// single sample, comma-joined list otherwise.
    pub fn encode(counts: &[u32]) -> String {
        counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_scalar() {
        assert_eq!(CountEncoding::parse("42"), Some(CountEncoding::Scalar(42)));
        assert_eq!(CountEncoding::parse(" 7 "), Some(CountEncoding::Scalar(7)));
    }

    #[test]
    fn test_parse_multi_sample() {
        assert_eq!(
            CountEncoding::parse("10,5,0"),
            Some(CountEncoding::MultiSample(vec![10, 5, 0]))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(CountEncoding::parse(""), None);
        assert_eq!(CountEncoding::parse("ten"), None);
        assert_eq!(CountEncoding::parse("10,-5"), None);
        assert_eq!(CountEncoding::parse("10,,5"), None);
        assert_eq!(CountEncoding::parse("3.5"), None);
    }

    #[test]
    fn test_encode_dual_form() {
        assert_eq!(CountEncoding::encode(&[42]), "42");
        assert_eq!(CountEncoding::encode(&[10, 5, 0]), "10,5,0");
    }

    #[test]
    fn test_vaf() {
        let rec = MutationRecord {
            id: "s0".to_string(),
            gene: "TP53".to_string(),
            ref_counts: vec![10, 0, 5],
            depths: vec![20, 0, 5],
            mu_r: 0.999,
            mu_v: 0.5,
        };
        assert_relative_eq!(rec.vaf(0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(rec.vaf(1), 0.0, epsilon = 1e-12); // zero depth
        assert_relative_eq!(rec.vaf(2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_validity() {
        let rec = MutationRecord {
            id: "s1".to_string(),
            gene: "KRAS".to_string(),
            ref_counts: vec![5, 30],
            depths: vec![10, 20],
            mu_r: 0.999,
            mu_v: 0.5,
        };
        assert!(rec.is_valid_sample(0));
        assert!(!rec.is_valid_sample(1)); // ref > depth
    }
}
