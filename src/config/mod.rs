mod server;

pub use server::{ADMIN_TOKEN_FILE_NAME, DB_FILE_NAME, ServerConfig};
