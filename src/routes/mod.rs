mod health_check;
mod authentication;
mod profile;
mod restaurant;
mod menu;
mod cart;
mod order;

pub use health_check::*;
pub use authentication::*;
pub use profile::*;
pub use restaurant::*;
pub use menu::*;
pub use cart::*;
pub use order::*;
