pub mod user;
pub mod restaurant;
pub mod menu;
pub mod cart;
pub mod orders;

pub use user::*;
pub use restaurant::*;
pub use menu::*;
pub use cart::*;
pub use orders::*;
