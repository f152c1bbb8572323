// Portfolio profile: relational model, slug allocation, transactional
// replace-all synchronization, and the HTTP handlers over them.

pub mod handlers;
pub mod models;
pub mod queries;
pub mod slug;
pub mod sync;
