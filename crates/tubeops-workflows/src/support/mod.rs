//! Customer support workflows

pub mod close_ticket;
pub mod create_ticket;
pub mod dashboard;

pub use close_ticket::CloseTicket;
pub use create_ticket::CreateTicket;
pub use dashboard::SupportDashboard;
