pub mod fallback;
pub mod normalizer;
