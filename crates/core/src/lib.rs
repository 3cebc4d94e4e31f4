//! Pack-opening simulation engine. Keep this crate free of IO and platform concerns.

pub mod cache;
pub mod cards;
pub mod catalog;
pub mod descriptor;
pub mod draw;
pub mod error;
pub mod format;
pub mod natural;
pub mod pool;
pub mod rng;
pub mod sampler;
pub mod selection;
pub mod session;
pub mod slots;

pub use cache::*;
pub use cards::*;
pub use catalog::*;
pub use descriptor::*;
pub use draw::*;
pub use error::*;
pub use format::*;
pub use natural::*;
pub use pool::*;
pub use rng::*;
pub use sampler::*;
pub use selection::*;
pub use session::*;
pub use slots::*;
