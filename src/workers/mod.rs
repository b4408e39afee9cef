pub mod autosave;

pub use autosave::AutosaveWorker;
