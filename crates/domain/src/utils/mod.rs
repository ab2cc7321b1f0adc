//! Pure string helpers shared by the triage layers

pub mod text;
