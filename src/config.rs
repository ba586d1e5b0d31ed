use crate::error::Result;
use crate::models::Currency;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub currency: CurrencyConfig,
    pub verification: VerificationThresholds,
    pub catalog: CatalogConfig,
    pub estimate: EstimateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` 指令, 可被 `RUST_LOG` 覆盖
    pub level: String,
    /// `text` 或 `json`
    pub format: String,
}

/// 货币换算配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub base: Currency,
    /// 无货币标记时的默认货币
    pub default_source: Currency,
    pub rates: CurrencyRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyRates {
    pub rub: f64,
    pub gel: f64,
    pub usd: f64,
}

/// 状态与结论阈值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationThresholds {
    /// 报价 ≤ market_max × 此值 为 ok
    pub ok_max_ratio: f64,
    /// 报价 ≤ market_avg × 此值 为 warning
    pub warning_avg_ratio: f64,
    pub fair_max_percent: f64,
    pub slightly_overpriced_max_percent: f64,
    pub overpriced_max_percent: f64,
    /// 兜底: market_min = 报价 × 此值
    pub fallback_min_ratio: f64,
    /// 兜底: market_avg = 报价 × 此值
    pub fallback_avg_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub region: String,
    /// 启动时用于构建目录的报价CSV
    #[serde(default)]
    pub seed_observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    pub overhead_ratio: f64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base: Currency::Rub,
            default_source: Currency::Gel,
            rates: CurrencyRates {
                rub: 1.0,
                gel: 34.0,
                usd: 90.0,
            },
        }
    }
}

impl Default for VerificationThresholds {
    fn default() -> Self {
        Self {
            ok_max_ratio: 1.1,
            warning_avg_ratio: 1.5,
            fair_max_percent: 10.0,
            slightly_overpriced_max_percent: 25.0,
            overpriced_max_percent: 50.0,
            fallback_min_ratio: 0.6,
            fallback_avg_ratio: 0.8,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
            currency: CurrencyConfig::default(),
            verification: VerificationThresholds::default(),
            catalog: CatalogConfig {
                region: "moscow".to_string(),
                seed_observations: None,
            },
            estimate: EstimateConfig {
                overhead_ratio: 0.1,
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序: 默认值 -> `config/estimate.toml`（或 `ESTIMATE_CONFIG`） -> `ESTIMATE__*` 环境变量
    pub fn load() -> Result<Self> {
        let path = std::env::var("ESTIMATE_CONFIG").unwrap_or_else(|_| "config/estimate".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("ESTIMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
