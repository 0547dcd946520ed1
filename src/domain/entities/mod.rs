//! Domain entities - The records a batch is made of

mod pokemon;
mod work_item;

pub use pokemon::Pokemon;
pub use work_item::WorkItem;
