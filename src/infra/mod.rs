pub mod notification;
pub mod upsource;
