pub mod recording_logger;
