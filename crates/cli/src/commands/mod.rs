pub mod chat;
pub mod classify;
pub mod doctor;
pub mod onboard;
pub mod status;
