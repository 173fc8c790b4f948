pub mod change_hub;

pub use change_hub::{ChangeEvent, ChangeHub, ChangeKind, Collection};
