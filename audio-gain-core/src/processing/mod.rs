pub mod buffer_transformer;
pub mod format_resolver;
pub mod wave_format;
