pub mod serde_ext;
pub mod signature;
pub mod time;
