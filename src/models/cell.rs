use serde::{Deserialize, Serialize};

/// 表格单元格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 显示文本（整数不带 .0）
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
        }
    }

    pub fn lowered(&self) -> String {
        self.display_text().to_lowercase()
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Option<f64>> for Cell {
    fn from(n: Option<f64>) -> Self {
        n.map(Self::Number).unwrap_or(Self::Empty)
    }
}

/// 工作表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

const CURRENCY_SYMBOLS: [char; 4] = ['₾', '₽', '$', '€'];
const CURRENCY_WORDS: [&str; 7] = ["руб.", "руб", "р.", "лари", "lari", "gel", "usd"];

/// 单元格转数字的唯一入口
///
/// 去掉货币符号和空白后解析分隔符:
/// 同时有 `,` 和 `.` 时逗号为千分位;
/// 只有逗号时, 每组恰好三位数则为千分位, 否则为小数点。
pub fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => n.is_finite().then_some(*n),
        Cell::Text(s) => parse_number_text(s),
    }
}

pub fn parse_number_text(raw: &str) -> Option<f64> {
    let mut text = raw.to_lowercase();
    for word in CURRENCY_WORDS {
        text = text.replace(word, "");
    }
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        cleaned.replace(',', "")
    } else if cleaned.contains(',') {
        let groups: Vec<&str> = cleaned.split(',').collect();
        let thousands = groups.len() > 1
            && !groups[0].is_empty()
            && groups[1..]
                .iter()
                .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));
        if thousands {
            cleaned.replace(',', "")
        } else if groups.len() == 2 {
            cleaned.replace(',', ".")
        } else {
            return None;
        }
    } else {
        cleaned
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_number(&Cell::Number(12.5)), Some(12.5));
        assert_eq!(parse_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_number(&Cell::Empty), None);
    }

    #[test]
    fn strips_currency_and_spaces() {
        assert_eq!(parse_number_text("1 500 ₽"), Some(1500.0));
        assert_eq!(parse_number_text("₾ 34"), Some(34.0));
        assert_eq!(parse_number_text("$1,250.50"), Some(1250.5));
        assert_eq!(parse_number_text("2\u{a0}000 руб."), Some(2000.0));
    }

    #[test]
    fn comma_is_decimal_or_thousands() {
        assert_eq!(parse_number_text("1,5"), Some(1.5));
        assert_eq!(parse_number_text("12,25"), Some(12.25));
        assert_eq!(parse_number_text("12,500"), Some(12500.0));
        assert_eq!(parse_number_text("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn rejects_text() {
        assert_eq!(parse_number_text("м²"), None);
        assert_eq!(parse_number_text("Штукатурка"), None);
        assert_eq!(parse_number_text("   "), None);
        assert_eq!(parse_number_text("1,2,3"), None);
    }

    #[test]
    fn cell_deserializes_untagged() {
        let row: Vec<Cell> = serde_json::from_str(r#"["Штукатурка стен", "м²", 100, 500, null]"#).unwrap();
        assert_eq!(row[0], Cell::text("Штукатурка стен"));
        assert_eq!(row[2], Cell::Number(100.0));
        assert_eq!(row[4], Cell::Empty);
    }

    #[test]
    fn display_text_drops_trailing_zero() {
        assert_eq!(Cell::Number(100.0).display_text(), "100");
        assert_eq!(Cell::Number(2.5).display_text(), "2.5");
    }
}
