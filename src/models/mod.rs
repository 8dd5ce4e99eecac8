pub mod transaction;
pub mod consumable;
pub mod tool;

pub use transaction::*;
pub use consumable::*;
pub use tool::*;
