pub mod folders;
pub mod health;
pub mod legacy;
pub mod sanitize;
pub mod upload_url;
