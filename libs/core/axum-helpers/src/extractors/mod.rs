//! Extractors whose rejections render through [`AppError`](crate::errors::AppError).

pub mod json_body;
pub mod uuid_path;

pub use json_body::JsonBody;
pub use uuid_path::UuidPath;
