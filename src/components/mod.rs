pub mod controls;
pub mod function_plot;
pub mod header;
pub mod network_diagram;
pub mod notification;
pub mod probability_bars;
