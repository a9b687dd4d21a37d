use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("invalid argument: null buffer with length {len}")]
    InvalidArgument { len: usize },
    #[error("unsupported element type `{type_name}` ({size} bytes), expected one of i32, u32, f32, i64, u64, f64")]
    UnsupportedType {
        type_name: &'static str,
        size: usize,
    },
}

pub type Result<T> = std::result::Result<T, SortError>;
