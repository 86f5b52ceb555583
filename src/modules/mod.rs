pub mod auth;
pub mod calendar;
pub mod classes;
pub mod email;
pub mod examinations;
pub mod fees;
pub mod integrations;
pub mod library;
pub mod messages;
pub mod staff;
pub mod students;
pub mod timetable;
pub mod users;
