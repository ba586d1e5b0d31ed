use crate::error::Result;
use crate::models::{parse_number_text, CatalogEntry, PriceObservation, Unit};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// 报价CSV的一行
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    raw_name: String,
    unit: String,
    price: String,
    source_id: String,
    #[serde(default)]
    includes_materials: Option<String>,
}

/// 读取报价CSV, 单位未知或价格无法解析的行跳过
pub fn read_observations(path: &Path) -> Result<Vec<PriceObservation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut observations = Vec::new();
    let mut skipped = 0usize;
    for (idx, record) in reader.deserialize::<ObservationRecord>().enumerate() {
        let record = record?;
        let line = idx + 2;

        let Some(unit) = Unit::parse(&record.unit) else {
            tracing::warn!("{}:{}: unknown unit '{}'", path.display(), line, record.unit);
            skipped += 1;
            continue;
        };
        let Some(price) = parse_number_text(&record.price) else {
            tracing::warn!("{}:{}: unreadable price '{}'", path.display(), line, record.price);
            skipped += 1;
            continue;
        };

        let mut observation = PriceObservation::new(record.raw_name, unit, price, record.source_id);
        observation.includes_materials = record
            .includes_materials
            .as_deref()
            .map(is_truthy)
            .unwrap_or(false);
        observations.push(observation);
    }

    tracing::info!(
        "read {} observations from {} ({} skipped)",
        observations.len(),
        path.display(),
        skipped
    );
    Ok(observations)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "y" | "да")
}

/// 导出目录到CSV, 来源用 `;` 连接
pub fn export_catalog(entries: &[CatalogEntry], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "category",
        "canonical_name",
        "unit",
        "price_min",
        "price_avg",
        "price_max",
        "region",
        "sample_count",
        "sources",
    ])?;
    for entry in entries {
        writer.write_record(&[
            entry.category.as_str().to_string(),
            entry.canonical_name.clone(),
            entry.unit.code().to_string(),
            entry.price_min.to_string(),
            entry.price_avg.to_string(),
            entry.price_max.to_string(),
            entry.region.clone(),
            entry.sample_count.to_string(),
            entry.sources.join(";"),
        ])?;
    }

    writer.flush()?;
    tracing::info!("exported {} catalog entries to {}", entries.len(), output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use std::fs;

    #[test]
    fn observations_are_read_and_bad_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.csv");
        fs::write(
            &path,
            "raw_name,unit,price,source_id,includes_materials\n\
             Штукатурка стен по маякам,м²,\"1 200\",remont.ge,\n\
             Укладка ламината,m2,450,remont.ge,true\n\
             Монтаж карниза,ведро,300,remont.ge,\n\
             Покраска стен,m2,n/a,remont.ge,\n",
        )
        .unwrap();

        let observations = read_observations(&path).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].price, 1200.0);
        assert_eq!(observations[0].unit, Unit::SquareMeter);
        assert!(!observations[0].includes_materials);
        assert!(observations[1].includes_materials);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_observations(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn catalog_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let entries = vec![CatalogEntry {
            category: Category::Walls,
            canonical_name: "Покраска стен".to_string(),
            unit: Unit::SquareMeter,
            price_min: 200.0,
            price_avg: 250.0,
            price_max: 300.0,
            region: "moscow".to_string(),
            sample_count: 3,
            sources: vec!["a".to_string(), "b".to_string()],
        }];
        export_catalog(&entries, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "category,canonical_name,unit,price_min,price_avg,price_max,region,sample_count,sources");
        assert_eq!(lines[1], "walls,Покраска стен,m2,200,250,300,moscow,3,a;b");
    }
}
