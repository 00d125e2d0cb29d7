pub mod model;
pub mod scanner;

pub use model::{ChapterBoundary, Outline, OutlineMetadata, FRONT_MATTER};
pub use scanner::{detect_chapters, OutlineScanner, OutlineSkeleton};
