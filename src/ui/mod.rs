pub mod filter_window;
pub mod insights;
pub mod panels;
pub mod plot;
