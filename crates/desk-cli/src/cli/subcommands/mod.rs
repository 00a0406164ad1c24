mod session;
mod ticket;

pub use session::SessionCommands;
pub use ticket::TicketCommands;
