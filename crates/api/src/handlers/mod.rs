pub mod callback;
pub mod upgrader;
