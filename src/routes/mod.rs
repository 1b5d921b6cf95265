pub mod health;
pub mod mentor;
