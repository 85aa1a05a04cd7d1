pub mod almanac;
pub mod schema;
pub mod ticket;

pub use almanac::AlmanacRecord;
pub use ticket::TicketRecord;
