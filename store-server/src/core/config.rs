use crate::auth::JwtConfig;

/// 服务器配置 - 商店引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/topup-store | 工作目录 (数据库文件) |
/// | ENVIRONMENT | development | 运行环境 |
/// | CATALOG_BASE_URL | http://localhost:4000 | 商品目录服务地址 |
/// | GIFT_EXPIRATION_HOURS | 24 | 礼物默认有效期(小时) |
/// | HISTORY_PAGE_SIZE | 50 | 交易历史默认每页条数 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库文件
    pub work_dir: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 商品目录服务 URL
    pub catalog_base_url: String,
    /// 礼物默认有效期 (小时)，请求未指定过期时间时使用
    pub gift_expiration_hours: i64,
    /// 交易历史默认每页条数
    pub history_page_size: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/topup-store".into()),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            catalog_base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000".into()),
            gift_expiration_hours: std::env::var("GIFT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            history_page_size: std::env::var("HISTORY_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        }
    }

    /// 使用自定义工作目录覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> String {
        format!("{}/ledger.redb", self.work_dir)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
