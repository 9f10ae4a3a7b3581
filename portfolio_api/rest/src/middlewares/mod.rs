pub mod client_address;
pub mod panic_handler;
pub mod request_id;
pub mod trace;
