pub mod order;
pub mod signal;

pub use order::{ExecutionChain, OpenOrder, OrderKind, OrderRecord};
pub use signal::{Side, Signal};
