pub mod codec;
pub mod command;
pub mod key;
pub mod value;

// Re-export key types for easier access from other memochain modules (and lib.rs)
pub use command::CommandRecord;
pub use key::{derive, DerivedKey};
pub use value::{Arguments, Table, Value};
