mod criteria;
mod product;
mod reference;
mod review;

pub use criteria::*;
pub use product::*;
pub use reference::*;
pub use review::*;
