pub mod ai;
pub mod contact;
pub mod diagnostics;
pub mod newsletter;
