use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Appends timestamped log lines to a file.
#[derive(Debug)]
pub struct FileLogger {
    log_file: PathBuf,
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    pub fn new(log_file: impl AsRef<Path>, debug: bool) -> io::Result<Self> {
        let log_file = log_file.as_ref();
        // Create log directory if it doesn't exist
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(log_file)?;

        Ok(FileLogger {
            log_file: log_file.to_path_buf(),
            level: if debug { LevelFilter::Debug } else { LevelFilter::Info },
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_file
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    fn write_line(&self, record: &Record) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        writeln!(
            file,
            "{}: [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        )
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Err(e) = self.write_line(record) {
            eprintln!("Failed to write to log file {}: {}", self.log_file.display(), e);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the global logger: a [`FileLogger`] when `log_file` is given,
/// otherwise `env_logger` honouring `RUST_LOG`.
pub fn init(log_file: Option<&Path>, debug: bool) -> io::Result<()> {
    match log_file {
        Some(path) => {
            let logger = FileLogger::new(path, debug)?;
            let level = logger.level();
            log::set_boxed_logger(Box::new(logger))
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            log::set_max_level(level);
        }
        None => {
            let mut builder = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("warn"),
            );
            if debug {
                builder.filter_level(LevelFilter::Debug);
            }
            builder
                .try_init()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
    }
    Ok(())
}
