pub mod dispatch;
pub mod init;
pub mod session;
pub mod shared;
pub mod ticket;
