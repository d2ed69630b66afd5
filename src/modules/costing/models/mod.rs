pub mod daily_costing;

pub use daily_costing::{CostingFigure, DailyCosting, FigureSource, PeriodCosting};
