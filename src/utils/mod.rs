pub mod jwt;
pub mod password;
pub mod email;
pub mod token_blacklist;
pub mod text;
