mod whisper_cli_worker;

pub use whisper_cli_worker::{WORKER_OUTPUT_FORMAT, WhisperCliWorker};
