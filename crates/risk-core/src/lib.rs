pub mod advisory;
pub mod error;
pub mod fixtures;
pub mod scoring;
pub mod traits;
pub mod types;

pub use advisory::{recommend, summarize};
pub use error::*;
pub use scoring::{aggregate, classify, normalize};
pub use traits::*;
pub use types::*;
