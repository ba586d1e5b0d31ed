use crate::models::{CatalogEntry, MatchTier};
use indexmap::IndexSet;

/// 词重叠匹配的最低分
pub const TOKEN_OVERLAP_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub tier: MatchTier,
    /// 精确和子串匹配为 1.0
    pub score: f64,
}

/// 三级模糊匹配: 精确 -> 子串 -> 词重叠
#[derive(Debug, Clone)]
pub struct CatalogMatcher {
    threshold: f64,
}

impl Default for CatalogMatcher {
    fn default() -> Self {
        Self {
            threshold: TOKEN_OVERLAP_THRESHOLD,
        }
    }
}

impl CatalogMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 各级依次尝试, 词重叠同分时取目录中靠前的条目
    pub fn match_name<'a>(&self, name: &str, catalog: &'a [CatalogEntry]) -> Option<CatalogMatch<'a>> {
        let query = name.trim().to_lowercase();
        if query.is_empty() || catalog.is_empty() {
            return None;
        }
        let names: Vec<String> = catalog
            .iter()
            .map(|e| e.canonical_name.trim().to_lowercase())
            .collect();

        // 1. 精确匹配
        if let Some(idx) = names.iter().position(|n| *n == query) {
            return Some(self.hit(&catalog[idx], MatchTier::Exact, 1.0));
        }

        // 2. 子串匹配（双向）
        if let Some(idx) = names
            .iter()
            .position(|n| !n.is_empty() && (n.contains(&query) || query.contains(n.as_str())))
        {
            return Some(self.hit(&catalog[idx], MatchTier::Substring, 1.0));
        }

        // 3. 词重叠
        let query_tokens = tokens(&query);
        let mut best: Option<(usize, f64)> = None;
        for (idx, n) in names.iter().enumerate() {
            let score = overlap_score(&query_tokens, &tokens(n));
            if score < self.threshold {
                continue;
            }
            let is_better = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if is_better {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, score)| self.hit(&catalog[idx], MatchTier::TokenOverlap, score))
    }

    fn hit<'a>(&self, entry: &'a CatalogEntry, tier: MatchTier, score: f64) -> CatalogMatch<'a> {
        CatalogMatch { entry, tier, score }
    }
}

fn tokens(value: &str) -> IndexSet<&str> {
    value.split_whitespace().collect()
}

/// 词重叠评分: 命中词数 / 较大的词数
pub fn overlap_score(query: &IndexSet<&str>, candidate: &IndexSet<&str>) -> f64 {
    let denominator = query.len().max(candidate.len());
    if denominator == 0 {
        return 0.0;
    }
    let overlap = query
        .iter()
        .filter(|q| candidate.iter().any(|c| c.contains(*q) || q.contains(c)))
        .count();
    overlap as f64 / denominator as f64
}
