pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CostingFigure, DailyCosting, FigureSource, PeriodCosting};
pub use services::{CostingCalculator, CostingService};
