mod register;
mod login;
mod create_user;

pub use register::*;
pub use login::*;
pub use create_user::*;

use serde::Serialize;
use uuid::Uuid;

use crate::models::User;

// Body returned by register, login and create-user; only the first two carry a token
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>
}

impl AuthResponse {
    pub fn new(user: User, token: Option<String>) -> Self {
        AuthResponse{
            id: user.user_id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            token
        }
    }
}
