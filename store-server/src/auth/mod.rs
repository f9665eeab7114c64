//! 认证模块
//!
//! 核心只信任 [`IdentityProvider`] 返回的身份：
//! - [`JwtIdentityProvider`] - JWT (HS256) 令牌验证
//! - [`StaticIdentityProvider`] - 测试用静态映射

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::util::now_millis;
use std::collections::HashMap;

/// Verified caller identity
///
/// Authorization checks (claimer == recipient, refunder == sender) trust
/// this and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

/// Token verification collaborator
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> AppResult<Identity>;
}

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌过期时间 (分钟)，仅用于本地签发
    pub expiration_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development-only key");
            "topup-store-development-only-key-not-for-production".to_string()
        });
        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "topup-store".to_string()),
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户邮箱
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 过期时间戳 (秒)
    pub exp: i64,
    /// 签发时间戳 (秒)
    pub iat: i64,
    /// 签发者
    pub iss: String,
}

/// JWT-backed identity provider
#[derive(Debug, Clone)]
pub struct JwtIdentityProvider {
    config: JwtConfig,
}

impl JwtIdentityProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// 签发令牌 (测试与开发环境)
    pub fn generate_token(&self, user_id: &str, email: Option<&str>) -> AppResult<String> {
        let now_secs = now_millis() / 1000;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            exp: now_secs + self.config.expiration_minutes * 60,
            iat: now_secs,
            iss: self.config.issuer.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("token generation failed: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_token(&self, token: &str) -> AppResult<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
            _ => AppError::invalid_token(e.to_string()),
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// Static token → identity map (tests and local tooling)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: &str, user_id: &str, email: Option<&str>) -> Self {
        self.identities.insert(
            token.to_string(),
            Identity {
                user_id: user_id.to_string(),
                email: email.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify_token(&self, token: &str) -> AppResult<Identity> {
        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::invalid_token("unknown token"))
    }
}
