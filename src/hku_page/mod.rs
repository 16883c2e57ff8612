pub mod api;
pub mod dto;
pub mod model;
pub mod time;

pub use model::Seminar;

pub const HKU_SEMINAR_URL: &str =
    "https://www.cs.hku.hk/programmes/research-based/mphil-phd-courses-offered";
pub const SUBJECT_PREFIX: &str = "[HKU CS Seminar] ";
