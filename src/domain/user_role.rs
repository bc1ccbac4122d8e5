use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole{
    ADMIN,
    CUSTOMER,
    DRIVER,
    RESTAURANT,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::ADMIN => "ADMIN",
            UserRole::CUSTOMER => "CUSTOMER",
            UserRole::DRIVER => "DRIVER",
            UserRole::RESTAURANT => "RESTAURANT"
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::ADMIN),
            "CUSTOMER" => Ok(UserRole::CUSTOMER),
            "DRIVER" => Ok(UserRole::DRIVER),
            "RESTAURANT" => Ok(UserRole::RESTAURANT),
            other => Err(format!("{} is not a valid role", other))
        }
    }
}
