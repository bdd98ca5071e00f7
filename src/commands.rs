pub mod read;
pub mod retrieve_token;
