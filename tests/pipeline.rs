use estimate_recon::config::AppConfig;
use estimate_recon::io::csv::{export_catalog, read_observations};
use estimate_recon::models::{
    Cell, Currency, ItemStatus, MatchTier, PriceObservation, Sheet, Unit, Verdict,
};
use estimate_recon::AppState;
use std::fs;

fn obs(name: &str, price: f64, source: &str) -> PriceObservation {
    PriceObservation::new(name, Unit::SquareMeter, price, source)
}

fn market_observations() -> Vec<PriceObservation> {
    vec![
        obs("Штукатурка стен по маякам", 400.0, "a"),
        obs("Штукатурка стен гипсовая по маякам", 408.0, "b"),
        obs("Штукатурка стен по маякам", 416.0, "c"),
        obs("Штукатурка стен по маякам до 3 см", 408.0, "d"),
        obs("Покраска стен", 170.0, "a"),
        obs("Покраска стен в 2 слоя", 190.0, "b"),
    ]
}

fn contractor_sheet() -> Sheet {
    Sheet::new(
        "Смета",
        vec![
            vec![Cell::text("Смета на ремонт квартиры")],
            vec![Cell::text("Адрес:"), Cell::text("ул. Тверская, 1")],
            vec![Cell::text("Площадь, м²"), Cell::Number(54.0)],
            vec![],
            vec![
                Cell::text("№"),
                Cell::text("Наименование работ"),
                Cell::text("Ед. изм."),
                Cell::text("Кол-во"),
                Cell::text("Цена, руб."),
                Cell::text("Сумма"),
            ],
            vec![
                Cell::Number(1.0),
                Cell::text("Штукатурка стен"),
                Cell::text("м²"),
                Cell::Number(50.0),
                Cell::Number(820.0),
                Cell::Number(41000.0),
            ],
            vec![
                Cell::Number(2.0),
                Cell::text("Покраска стен"),
                Cell::text("м²"),
                Cell::Number(100.0),
                Cell::Number(185.0),
                Cell::Empty,
            ],
            vec![
                Cell::Empty,
                Cell::text("Итого"),
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                Cell::Number(59500.0),
            ],
        ],
    )
}

#[tokio::test]
async fn spreadsheet_to_verdict() {
    let state = AppState::new(&AppConfig::default()).unwrap();
    state.catalog.rebuild(&market_observations(), "moscow").await.unwrap();
    let catalog = state.catalog.entries_for_region("moscow").await;
    assert_eq!(catalog.len(), 2);

    // 1. extraction
    let parsed = state.parser.parse_sheets(&[contractor_sheet()]);
    assert_eq!(parsed.metadata.currency, Some(Currency::Rub));
    assert_eq!(parsed.metadata.address.as_deref(), Some("ул. Тверская, 1"));
    assert_eq!(parsed.metadata.area_sqm, Some(54.0));
    assert_eq!(parsed.items.len(), 2);
    assert_eq!(parsed.total, 59500.0);

    // 2. reconciliation
    let result = state.verifier.verify(&parsed.items, &catalog).unwrap();

    let plaster = &result.items[0];
    assert_eq!(plaster.match_tier, MatchTier::Substring);
    assert_eq!(plaster.market_avg, 408.0);
    assert_eq!(plaster.overpay_percent, 101.0);
    assert_eq!(plaster.overpay_amount, 20600.0);
    assert_eq!(plaster.status, ItemStatus::Overpay);

    let paint = &result.items[1];
    assert_eq!(paint.match_tier, MatchTier::Exact);
    assert_eq!(paint.market_avg, 180.0);
    assert_eq!(paint.status, ItemStatus::Ok);

    assert_eq!(result.total_contractor, 59500.0);
    assert_eq!(result.total_market_avg, 38400.0);
    assert_eq!(result.total_overpay, 21100.0);
    assert_eq!(result.overpay_percent, 55.0);
    assert_eq!(result.verdict, Verdict::Ripoff);
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].name, "Штукатурка стен");
}

#[tokio::test]
async fn empty_catalog_degrades_to_fallback() {
    let state = AppState::new(&AppConfig::default()).unwrap();
    let parsed = state.parser.parse_sheets(&[contractor_sheet()]);
    let catalog = state.catalog.entries_for_region("moscow").await;
    assert!(catalog.is_empty());

    let result = state.verifier.verify(&parsed.items, &catalog).unwrap();
    assert!(result.items.iter().all(|i| i.match_tier == MatchTier::None));
    assert!(result.items.iter().all(|i| i.status == ItemStatus::Ok));
    assert_eq!(result.overpay_percent, 25.0);
}

#[tokio::test]
async fn csv_seed_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("observations.csv");
    fs::write(
        &seed,
        "raw_name,unit,price,source_id,includes_materials\n\
         Штукатурка стен по маякам,м²,400,a,\n\
         Штукатурка стен по маякам,м²,416,b,\n\
         Поклейка обоев с материалом,м²,650,c,true\n\
         Монтаж плинтуса,м.п.,136,a,\n",
    )
    .unwrap();

    let state = AppState::new(&AppConfig::default()).unwrap();
    let observations = read_observations(&seed).unwrap();
    let report = state.catalog.rebuild(&observations, "moscow").await.unwrap();
    assert_eq!(report.observations, 4);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.entries, 2);

    let out = dir.path().join("catalog.csv");
    let entries = state.catalog.entries_for_region("moscow").await;
    export_catalog(&entries, &out).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(written.contains("walls,Штукатурка стен по маякам,m2,400,408,416,moscow,2,a;b"));
    assert!(written.contains("floors,Монтаж плинтусов,lm,136,136,136,moscow,1,a"));
}
