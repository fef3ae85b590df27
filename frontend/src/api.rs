//! REST 服务层
//!
//! `client` 提供传输接缝和拦截器；其余每个子模块对应一种后端资源，
//! 以 `impl ApiClient` 的形式提供一一对应的请求方法。

pub mod client;
#[cfg(test)]
pub mod mock;

mod attachments;
mod auth;
mod categories;
mod comments;
mod reminders;
mod settings;
mod statistics;
mod tasks;
mod users;

pub use client::{ApiClient, Download, HttpRequest, HttpResponse, RequestBody, Transport};
