pub mod classify;
pub mod similarity;

pub use classify::{apply_content_bonus, classify, ContentType};
pub use similarity::{levenshtein_distance, normalize, similarity, SimilarityOptions};
