mod queue;
mod registry;

pub use queue::PendingQueue;
pub use registry::Registry;
