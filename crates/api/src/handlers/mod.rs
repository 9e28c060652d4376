pub mod auth;
pub mod cases;
pub mod inventory;
pub mod upgrade;
