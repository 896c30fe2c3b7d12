pub mod card;
pub mod generation;
pub mod layout;

pub use card::*;
pub use generation::*;
pub use layout::*;
