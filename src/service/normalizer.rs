use crate::error::{EstimateError, Result};
use crate::service::vocabulary::Vocabulary;
use regex::Regex;

/// 工程名称标准化
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    rules: Vec<(Regex, String)>,
}

impl NameNormalizer {
    pub fn new(vocab: &Vocabulary) -> Result<Self> {
        let rules = vocab
            .rewrite_rules
            .iter()
            .map(|(pattern, canonical)| {
                Regex::new(&format!("(?i){pattern}"))
                    .map(|re| (re, canonical.clone()))
                    .map_err(|e| EstimateError::Config(format!("rewrite rule '{pattern}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// 小写并合并空白, 命中的第一条改写规则替换整个名称
    pub fn canonical_key(&self, raw: &str) -> String {
        let lowered = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(&lowered))
            .map(|(_, canonical)| canonical.clone())
            .unwrap_or(lowered)
    }

    pub fn display_name(&self, raw: &str) -> String {
        capitalize(&self.canonical_key(raw))
    }
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
