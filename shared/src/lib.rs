//! TaskHub 共享模型
//!
//! 前端与后端约定的数据结构、端点定义和时间工具。
//! 不依赖 DOM，可以在原生目标上直接测试。

pub mod date;
pub mod models;
pub mod protocol;

pub use models::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// LocalStorage 中保存访问令牌的键
pub const STORAGE_TOKEN_KEY: &str = "token";
/// LocalStorage 中保存管理员标记的键（值为 "true" / "false"）
pub const STORAGE_ADMIN_KEY: &str = "isAdmin";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 上传附件时 multipart 表单中的字段名
pub const ATTACHMENT_FIELD: &str = "file";
