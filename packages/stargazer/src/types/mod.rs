pub mod snapshot;
pub mod stats;
pub mod work_item;
