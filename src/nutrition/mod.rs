//! Nutrition Display Metrics
//!
//! Display-only values derived from server data. Nothing here changes
//! what the server computed: the nutrition score and hydration target are
//! taken as given and only scaled for bars.
//!
//! - **micronutrients**: `"Name (unit)"` key parsing and vitamin/mineral
//!   grouping
//! - **bars**: stacked logged/planned progress, hydration and score bars
//! - **totals**: macro sums for planned entries and draft meal plans
//! - **export**: CSV export of daily logs

pub mod bars;
pub mod export;
pub mod micronutrients;
pub mod totals;

pub use bars::{HydrationDisplay, ScoreDisplay, StackedBar};
pub use micronutrients::{categorize, parse_micronutrient_key, MicronutrientGroup, MicronutrientKey};
pub use export::write_logs_csv;
pub use totals::{normalize_unit, MacroTotals};
