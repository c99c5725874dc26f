pub mod manager;
pub mod range_scorer;
pub mod similarity;
pub mod uen;
