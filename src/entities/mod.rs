pub mod client;
pub mod part;
pub mod part_type;
pub mod sequence;
pub mod stock_movement;
pub mod supplier;
pub mod vehicle;
pub mod work_order;
