pub mod commentary;
pub mod health;
pub mod matches;
pub mod ws;
