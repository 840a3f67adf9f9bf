pub mod migrate;
pub mod password;
pub mod seed;
