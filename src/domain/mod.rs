pub mod user_email;
pub mod phone_number;
pub mod user_role;
pub mod order_status;
pub mod checkout;
