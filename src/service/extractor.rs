use crate::models::{parse_number, Cell, EstimateMetadata, RawLineItem, Sheet};
use crate::service::vocabulary::{contains_any, equals_any, Vocabulary};
use std::fmt;
use std::sync::Arc;

/// 表头和元数据的扫描行数
const HEADER_SCAN_ROWS: usize = 15;
const MIN_FALLBACK_NAME_CHARS: usize = 5;
const MIN_NAME_CHARS: usize = 3;
/// 以此开头的行是小计（`итого по смете`）
const SUMMARY_PREFIX: &str = "итого";

/// 数值启发式的上限
const MAX_HEURISTIC_VALUE: f64 = 1_000_000.0;
const MAX_AREA_SQM: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Name,
    Unit,
    Quantity,
    Price,
    Total,
}

/// 表头各角色对应的列
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub name: Option<usize>,
    pub unit: Option<usize>,
    pub quantity: Option<usize>,
    pub price: Option<usize>,
    pub total: Option<usize>,
}

impl ColumnRoles {
    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Name => &mut self.name,
            ColumnRole::Unit => &mut self.unit,
            ColumnRole::Quantity => &mut self.quantity,
            ColumnRole::Price => &mut self.price,
            ColumnRole::Total => &mut self.total,
        }
    }

    pub fn contains(&self, col: usize) -> bool {
        [self.name, self.unit, self.quantity, self.price, self.total].contains(&Some(col))
    }
}

/// 表格起始位置与列角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderLayout {
    /// 未找到表头时为 None, 所有行都是数据行
    pub row: Option<usize>,
    pub roles: ColumnRoles,
}

impl HeaderLayout {
    fn first_data_row(&self) -> usize {
        self.row.map(|r| r + 1).unwrap_or(0)
    }
}

/// 名称提取策略, 依次尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStrategy {
    HeaderColumn,
    FirstLongText,
}

pub const NAME_STRATEGIES: [NameStrategy; 2] = [NameStrategy::HeaderColumn, NameStrategy::FirstLongText];

/// 单位提取策略, 依次尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStrategy {
    HeaderColumn,
    AliasScan,
}

pub const UNIT_STRATEGIES: [UnitStrategy; 2] = [UnitStrategy::HeaderColumn, UnitStrategy::AliasScan];

/// 数量/单价/总价的填充策略, 只填充仍为空的值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureStrategy {
    /// 读取表头指定的列
    HeaderColumns,
    /// 无角色列中的数字排序: 最小为数量, 次大为单价, 最大为总价
    /// （有表头时, 已被角色占用的列不参与）
    NumericSpread,
    /// 由总价/数量推算单价, 或由单价*数量推算总价
    Arithmetic,
}

pub const FIGURE_STRATEGIES: [FigureStrategy; 3] = [
    FigureStrategy::HeaderColumns,
    FigureStrategy::NumericSpread,
    FigureStrategy::Arithmetic,
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Figures {
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub total: Option<f64>,
}

impl Figures {
    pub fn is_complete(&self) -> bool {
        self.quantity.is_some() && self.price.is_some() && self.total.is_some()
    }
}

/// 行被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    Blank,
    NoName,
    SummaryRow,
    NoQuantity,
    NoPrice,
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Blank => "blank row",
            Self::NoName => "no usable name",
            Self::SummaryRow => "summary row",
            Self::NoQuantity => "no positive quantity",
            Self::NoPrice => "no usable price",
        };
        f.write_str(reason)
    }
}

/// 无模式的报价行提取器
#[derive(Debug, Clone)]
pub struct TabularExtractor {
    vocab: Arc<Vocabulary>,
}

impl TabularExtractor {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// 提取工作表的所有可用行, 不可用的行直接丢弃
    pub fn extract_sheet(&self, sheet: &Sheet) -> Vec<RawLineItem> {
        let layout = self.locate_header(sheet);
        let mut items = Vec::new();
        let mut discarded = 0usize;

        for (idx, row) in sheet.rows.iter().enumerate().skip(layout.first_data_row()) {
            match self.extract_row(row, &layout) {
                Ok(item) => items.push(item),
                Err(Discard::Blank) => {}
                Err(reason) => {
                    discarded += 1;
                    tracing::debug!("sheet '{}' row {}: discarded ({})", sheet.name, idx + 1, reason);
                }
            }
        }

        tracing::info!(
            "sheet '{}': header row {:?}, {} items extracted, {} rows discarded",
            sheet.name,
            layout.row.map(|r| r + 1),
            items.len(),
            discarded
        );
        items
    }

    /// 查找表头行并分配列角色
    pub fn locate_header(&self, sheet: &Sheet) -> HeaderLayout {
        for (idx, row) in sheet.rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
            let mut roles = ColumnRoles::default();
            for (col, cell) in row.iter().enumerate() {
                if let Some(role) = self.header_role(&cell.lowered()) {
                    let slot = roles.slot(role);
                    if slot.is_none() {
                        *slot = Some(col);
                    }
                }
            }
            if roles.name.is_some() {
                return HeaderLayout { row: Some(idx), roles };
            }
        }
        HeaderLayout::default()
    }

    fn header_role(&self, text: &str) -> Option<ColumnRole> {
        let kw = &self.vocab.header;
        if text.is_empty() {
            None
        } else if contains_any(text, &kw.price) && !contains_any(text, &kw.price_exclude) {
            Some(ColumnRole::Price)
        } else if contains_any(text, &kw.total) {
            Some(ColumnRole::Total)
        } else if contains_any(text, &kw.quantity) {
            Some(ColumnRole::Quantity)
        } else if contains_any(text, &kw.unit) || equals_any(text, &kw.unit_exact) {
            Some(ColumnRole::Unit)
        } else if contains_any(text, &kw.name) {
            Some(ColumnRole::Name)
        } else {
            None
        }
    }

    pub fn extract_row(&self, row: &[Cell], layout: &HeaderLayout) -> Result<RawLineItem, Discard> {
        if row.iter().all(Cell::is_empty) {
            return Err(Discard::Blank);
        }

        let name = NAME_STRATEGIES
            .iter()
            .find_map(|s| self.resolve_name(*s, row, layout))
            .ok_or(Discard::NoName)?;
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(Discard::NoName);
        }
        if self.is_summary(&name) {
            return Err(Discard::SummaryRow);
        }

        let unit = UNIT_STRATEGIES
            .iter()
            .find_map(|s| self.resolve_unit(*s, row, layout));

        let figures = self.resolve_figures(row, layout);
        let quantity = figures.quantity.filter(|q| *q > 0.0).ok_or(Discard::NoQuantity)?;
        let price = figures.price.filter(|p| *p > 0.0).ok_or(Discard::NoPrice)?;
        let total = figures.total.unwrap_or_else(|| (price * quantity).round());

        Ok(RawLineItem {
            name,
            unit,
            quantity: Some(quantity),
            unit_price: Some(price),
            line_total: Some(total),
        })
    }

    pub fn resolve_figures(&self, row: &[Cell], layout: &HeaderLayout) -> Figures {
        let mut figures = Figures::default();
        for strategy in FIGURE_STRATEGIES {
            if figures.is_complete() {
                break;
            }
            self.apply_figures(strategy, row, layout, &mut figures);
        }
        figures
    }

    fn apply_figures(&self, strategy: FigureStrategy, row: &[Cell], layout: &HeaderLayout, figures: &mut Figures) {
        match strategy {
            FigureStrategy::HeaderColumns => {
                let read = |col: Option<usize>| col.and_then(|c| row.get(c)).and_then(parse_number);
                figures.quantity = figures.quantity.or_else(|| read(layout.roles.quantity));
                figures.price = figures.price.or_else(|| read(layout.roles.price));
                figures.total = figures.total.or_else(|| read(layout.roles.total));
            }
            FigureStrategy::NumericSpread => {
                if figures.quantity.is_some() && figures.price.is_some() {
                    return;
                }
                let mut numbers: Vec<f64> = row
                    .iter()
                    .enumerate()
                    .filter(|(col, _)| !layout.roles.contains(*col))
                    .filter_map(|(_, cell)| parse_number(cell))
                    .filter(|n| *n > 0.0 && *n < MAX_HEURISTIC_VALUE)
                    .collect();
                if numbers.len() < 2 {
                    return;
                }
                numbers.sort_by(|a, b| a.total_cmp(b));
                let last = numbers.len() - 1;
                figures.quantity = figures.quantity.or(Some(numbers[0]));
                if numbers.len() >= 3 {
                    figures.price = figures.price.or(Some(numbers[last - 1]));
                }
                figures.total = figures.total.or(Some(numbers[last]));
            }
            FigureStrategy::Arithmetic => {
                let Some(quantity) = figures.quantity.filter(|q| *q > 0.0) else {
                    return;
                };
                if figures.price.is_none() {
                    figures.price = figures.total.map(|t| (t / quantity).round());
                }
                if figures.total.is_none() {
                    figures.total = figures.price.map(|p| (p * quantity).round());
                }
            }
        }
    }

    fn resolve_name(&self, strategy: NameStrategy, row: &[Cell], layout: &HeaderLayout) -> Option<String> {
        let name = match strategy {
            NameStrategy::HeaderColumn => layout
                .roles
                .name
                .and_then(|c| row.get(c))
                .map(|cell| normalize_work_name(&cell.display_text())),
            NameStrategy::FirstLongText => row
                .iter()
                .filter_map(Cell::as_text)
                .find(|text| text.trim().chars().count() > MIN_FALLBACK_NAME_CHARS && !self.is_header_like(text))
                .map(normalize_work_name),
        };
        name.filter(|n| !n.is_empty())
    }

    fn resolve_unit(&self, strategy: UnitStrategy, row: &[Cell], layout: &HeaderLayout) -> Option<String> {
        let unit = match strategy {
            UnitStrategy::HeaderColumn => layout.roles.unit.and_then(|c| row.get(c)).map(Cell::display_text),
            UnitStrategy::AliasScan => row
                .iter()
                .filter_map(Cell::as_text)
                .map(|t| t.trim().to_string())
                .find(|t| {
                    let lowered = t.to_lowercase();
                    self.vocab
                        .unit_aliases
                        .iter()
                        .any(|(_, aliases)| equals_any(&lowered, aliases))
                }),
        };
        unit.filter(|u| !u.is_empty())
    }

    fn is_header_like(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        contains_any(&lowered, &self.vocab.name_skip_contains) || equals_any(&lowered, &self.vocab.name_skip_equals)
    }

    fn is_summary(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.vocab
            .name_skip_equals
            .iter()
            .any(|k| lowered == *k || lowered.starts_with(&format!("{k}:")))
            || lowered.starts_with(&format!("{SUMMARY_PREFIX} "))
    }

    /// 提取地址、客户和面积
    pub fn extract_metadata(&self, sheet: &Sheet) -> EstimateMetadata {
        let labels = &self.vocab.metadata;
        let mut metadata = EstimateMetadata::default();

        for (r, row) in sheet.rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(text) = cell.as_text() else { continue };
                let lowered = text.to_lowercase();
                let neighbour = sheet.cell(r, c + 1).filter(|n| !n.is_empty());

                if metadata.address.is_none() && contains_any(&lowered, &labels.address) {
                    metadata.address = neighbour.map(Cell::display_text);
                }
                if metadata.customer.is_none() && contains_any(&lowered, &labels.customer) {
                    metadata.customer = neighbour.map(Cell::display_text);
                }
                if metadata.area_sqm.is_none()
                    && contains_any(&lowered, &labels.area)
                    && contains_any(&lowered, &labels.area_unit)
                {
                    metadata.area_sqm = neighbour
                        .and_then(parse_number)
                        .filter(|a| *a > 0.0 && *a < MAX_AREA_SQM);
                }
            }
        }
        metadata
    }
}

/// 去除首尾空白、序号前缀和破折号
pub fn normalize_work_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut rest = collapsed.as_str();

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &rest[digits..];
        if let Some(stripped) = after.strip_prefix('.').or_else(|| after.strip_prefix(')')) {
            rest = stripped.trim_start();
        }
    }
    if let Some(stripped) = rest.strip_prefix(|c: char| matches!(c, '-' | '–' | '—')) {
        rest = stripped.trim_start();
    }
    rest.to_string()
}
