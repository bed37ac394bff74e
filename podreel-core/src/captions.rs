pub mod track;
pub mod transcribe;
