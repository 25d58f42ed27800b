pub mod local;

pub use local::LocalRemote;
