pub mod access_gate;
pub mod auth;
pub mod backup;
pub mod exam_flow;
pub mod media_library;
pub mod question_bank;
pub mod statistics;
pub mod tutor;
