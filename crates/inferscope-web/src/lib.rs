//! inferscope-web — Browser dashboard over the remote inference / tracking API.
//! Pages:
//!   - Run inference on a recent submission and export the results
//!   - Performance overview of tracked submissions (filters, stats, pagination)
//!   - Per-submission detail with production vs shadow breakdown

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod view;
