pub mod copy;
pub mod dispatch;
pub mod purge;
