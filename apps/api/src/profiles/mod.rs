// Graduate profiles (skills + computed job matches) and mentor feedback.

pub mod feedback;
pub mod handlers;
