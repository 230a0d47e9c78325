//! In-memory stores for users, groups and recorded expenses.
//!
//! Each registry hands out sequential ids starting at 1 and is owned by
//! whoever creates it; nothing here is global.

pub mod expenses;
pub mod groups;
pub mod users;
