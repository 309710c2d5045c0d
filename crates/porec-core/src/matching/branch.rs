//! Branch resolution: header alias to canonical branch row.
//!
//! Franchise clients reuse one display alias across several branches, so
//! exact alias equality can leave more than one candidate. Tax ID and
//! responsible name break ties; when they cannot, resolution fails rather
//! than picking arbitrarily.

use tracing::{debug, trace};

use crate::models::catalog::Branch;
use crate::normalize::{normalize, token_overlap};

/// Resolves a branch alias against the client's active branches.
pub struct BranchResolver {
    /// Minimum Jaccard overlap for the similarity fallback; a candidate
    /// must score strictly above this. Tuning constant with no derivation,
    /// so it stays configurable.
    score_threshold: f32,
}

impl BranchResolver {
    pub fn new() -> Self {
        Self {
            score_threshold: 0.5,
        }
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Resolution cascade: exact alias/name equality, then tax-ID filter,
    /// then responsible-name filter; zero exact candidates falls back to
    /// token-overlap ranking. Any remaining ambiguity is a failure.
    pub fn resolve<'a>(
        &self,
        candidates: &'a [Branch],
        alias: Option<&str>,
        tax_id: Option<&str>,
        responsible_name: Option<&str>,
    ) -> Option<&'a Branch> {
        let alias = alias?.trim();
        if alias.is_empty() {
            return None;
        }
        let target = normalize(alias);

        let mut exact: Vec<&Branch> = candidates
            .iter()
            .filter(|b| normalize(&b.alias) == target || normalize(&b.canonical_name) == target)
            .collect();

        if exact.is_empty() {
            return self.resolve_by_similarity(candidates, &target);
        }
        if exact.len() == 1 {
            return Some(exact[0]);
        }

        // Same alias on several branches: disambiguate by tax ID.
        if let Some(tax_id) = tax_id {
            let filtered: Vec<&Branch> = exact
                .iter()
                .copied()
                .filter(|b| b.tax_id.as_deref() == Some(tax_id))
                .collect();
            if filtered.len() == 1 {
                return Some(filtered[0]);
            }
            if !filtered.is_empty() {
                exact = filtered;
            }
        }

        // Still tied: disambiguate by responsible contact.
        if let Some(name) = responsible_name {
            let name_norm = normalize(name);
            let filtered: Vec<&Branch> = exact
                .iter()
                .copied()
                .filter(|b| {
                    b.responsible_name
                        .as_deref()
                        .map(|r| normalize(r) == name_norm)
                        .unwrap_or(false)
                })
                .collect();
            if filtered.len() == 1 {
                return Some(filtered[0]);
            }
        }

        debug!(alias, candidates = exact.len(), "ambiguous branch alias");
        None
    }

    /// Token-overlap ranking over alias and canonical name. Best score
    /// wins if it clears the threshold; a tie at the top is ambiguous.
    fn resolve_by_similarity<'a>(
        &self,
        candidates: &'a [Branch],
        target: &str,
    ) -> Option<&'a Branch> {
        let mut best: Option<&Branch> = None;
        let mut best_score = 0.0f32;
        let mut tied = false;

        for branch in candidates {
            let score = token_overlap(target, &branch.alias)
                .max(token_overlap(target, &branch.canonical_name));
            trace!(branch = %branch.canonical_name, score, "similarity candidate");
            if score > best_score {
                best = Some(branch);
                best_score = score;
                tied = false;
            } else if score == best_score && best.is_some() {
                tied = true;
            }
        }

        if tied || best_score <= self.score_threshold {
            debug!(target, best_score, tied, "similarity fallback rejected");
            return None;
        }
        best
    }
}

impl Default for BranchResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(id: i64, name: &str, alias: &str, tax_id: Option<&str>, resp: Option<&str>) -> Branch {
        Branch {
            id,
            canonical_name: name.to_string(),
            alias: alias.to_string(),
            tax_id: tax_id.map(|s| s.to_string()),
            responsible_name: resp.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_unique_alias_resolves() {
        let branches = vec![
            branch(1, "Store North", "NORTH", None, None),
            branch(2, "Store South", "SOUTH", None, None),
        ];
        let r = BranchResolver::new();
        let b = r.resolve(&branches, Some("north"), None, None).unwrap();
        assert_eq!(b.id, 1);
    }

    #[test]
    fn test_canonical_name_also_matches_exactly() {
        let branches = vec![branch(1, "Store North", "N-01", None, None)];
        let r = BranchResolver::new();
        let b = r.resolve(&branches, Some("store north"), None, None).unwrap();
        assert_eq!(b.id, 1);
    }

    #[test]
    fn test_duplicate_alias_tax_id_breaks_tie() {
        let branches = vec![
            branch(1, "Main One", "MAIN", Some("111"), None),
            branch(2, "Main Two", "MAIN", Some("222"), None),
        ];
        let r = BranchResolver::new();
        let b = r.resolve(&branches, Some("MAIN"), Some("111"), None).unwrap();
        assert_eq!(b.id, 1);
    }

    #[test]
    fn test_duplicate_alias_without_tax_id_fails() {
        let branches = vec![
            branch(1, "Main One", "MAIN", Some("111"), None),
            branch(2, "Main Two", "MAIN", Some("222"), None),
        ];
        let r = BranchResolver::new();
        assert!(r.resolve(&branches, Some("MAIN"), None, None).is_none());
    }

    #[test]
    fn test_responsible_name_breaks_remaining_tie() {
        let branches = vec![
            branch(1, "Main One", "MAIN", Some("111"), Some("Ana Ruiz")),
            branch(2, "Main Two", "MAIN", Some("111"), Some("Luis Vega")),
        ];
        let r = BranchResolver::new();
        let b = r
            .resolve(&branches, Some("MAIN"), Some("111"), Some("ana ruiz"))
            .unwrap();
        assert_eq!(b.id, 1);

        // No responsible supplied: still ambiguous, must fail.
        assert!(r.resolve(&branches, Some("MAIN"), Some("111"), None).is_none());
    }

    #[test]
    fn test_similarity_fallback_accepts_above_threshold() {
        let branches = vec![
            branch(1, "Store North Plaza", "STORE NORTH PLAZA", None, None),
            branch(2, "Warehouse East", "WH EAST", None, None),
        ];
        let r = BranchResolver::new().with_score_threshold(0.5);
        let b = r
            .resolve(&branches, Some("north plaza store"), None, None)
            .unwrap();
        assert_eq!(b.id, 1);
    }

    #[test]
    fn test_similarity_fallback_rejects_below_threshold() {
        let branches = vec![branch(1, "Store North Plaza", "SNP", None, None)];
        let r = BranchResolver::new().with_score_threshold(0.5);
        assert!(r.resolve(&branches, Some("completely different"), None, None).is_none());
    }

    #[test]
    fn test_missing_alias_fails() {
        let branches = vec![branch(1, "Store", "S", None, None)];
        let r = BranchResolver::new();
        assert!(r.resolve(&branches, None, Some("111"), None).is_none());
        assert!(r.resolve(&branches, Some("   "), None, None).is_none());
    }
}
