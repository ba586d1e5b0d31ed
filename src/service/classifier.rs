use crate::models::{Category, Unit};
use crate::service::vocabulary::{equals_any, first_hit, Vocabulary};
use std::sync::Arc;

/// 关键词分类器
#[derive(Debug, Clone)]
pub struct Classifier {
    vocab: Arc<Vocabulary>,
}

impl Classifier {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn classify(&self, name: &str) -> Category {
        first_hit(&self.vocab.categories, &name.to_lowercase()).unwrap_or(Category::Other)
    }

    /// 单位: 单元格 -> 名称提示 -> 默认 m²
    pub fn infer_unit(&self, unit_cell: Option<&str>, name: &str) -> Unit {
        let explicit = unit_cell
            .map(|u| u.trim().to_lowercase())
            .filter(|u| !u.is_empty())
            .and_then(|u| {
                self.vocab
                    .unit_aliases
                    .iter()
                    .find(|(_, aliases)| equals_any(&u, aliases))
                    .map(|(unit, _)| *unit)
            });

        explicit
            .or_else(|| first_hit(&self.vocab.unit_hints, &name.to_lowercase()))
            .unwrap_or(Unit::SquareMeter)
    }
}
