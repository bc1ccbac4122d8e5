mod get;
mod post;
mod update;
mod delete;
mod orders;

pub use get::*;
pub use post::*;
pub use update::*;
pub use delete::*;
pub use orders::*;
