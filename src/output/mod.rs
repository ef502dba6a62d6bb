pub mod format;
pub mod hit_printer;

pub use format::{render, HitFormat, Layout};
pub use hit_printer::spawn_hit_printer;
