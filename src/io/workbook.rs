use crate::error::{EstimateError, Result};
use crate::models::{Cell, Sheet};
use calamine::{open_workbook_from_rs, DataType, Reader, Xlsx};
use std::io::Cursor;

/// xlsx 文件头 (ZIP)
const ZIP_SIGNATURE: &[u8] = b"PK";

pub fn is_spreadsheet(bytes: &[u8]) -> bool {
    bytes.len() > 4 && bytes.starts_with(ZIP_SIGNATURE)
}

/// 读取 xlsx 的所有工作表
pub fn load_workbook(bytes: &[u8]) -> Result<Vec<Sheet>> {
    if !is_spreadsheet(bytes) {
        return Err(EstimateError::Workbook("not an xlsx workbook".to_string()));
    }

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| EstimateError::Workbook(format!("failed to open workbook: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&name) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                tracing::warn!("skipping unreadable sheet '{}': {}", name, e);
                continue;
            }
            None => continue,
        };
        let rows = range
            .rows()
            .map(|row| row.iter().map(to_cell).collect())
            .collect();
        sheets.push(Sheet::new(name, rows));
    }

    tracing::info!("workbook loaded: {} sheets", sheets.len());
    Ok(sheets)
}

fn to_cell(value: &DataType) -> Cell {
    match value {
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::String(s) => Cell::Text(s.clone()),
        _ => Cell::Empty,
    }
}
