pub mod cat;
pub mod decrypt;
pub mod encrypt;
pub mod info;
