mod add;
mod update;
mod remove;
mod get;
mod delete;

pub use add::*;
pub use update::*;
pub use remove::*;
pub use get::*;
pub use delete::*;
