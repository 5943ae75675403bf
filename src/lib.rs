//! SpaceX launch records dashboard.
//!
//! ```text
//!  data::loader ─▶ LaunchDataset ─▶ DashboardContext (Arc, read-only)
//!                                         │
//!        control change ─▶ state::Dashboard / state::render_all
//!                                         │
//!                      data::filter ─▶ chart::ChartSpec ─▶ egui / HTTP
//! ```

pub mod chart;
pub mod color;
pub mod config;
pub mod context;
pub mod data;
pub mod server;
pub mod state;
