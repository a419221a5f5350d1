use async_trait::async_trait;
use mesabot_core::{ReservationRecord, ReservationSink};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SEPARATOR: &str = "-----------------------------";

/// Render one record as a log block.
#[must_use]
pub fn format_record(record: &ReservationRecord) -> String {
    format!(
        "Reserva - {} -\n Datos de la reserva: {}\nPersonas: {}\nFecha: {}\nHora: {}\n{SEPARATOR}\n",
        record.recorded_at.format("%Y-%m-%d %H:%M:%S"),
        record.name,
        record.party_size,
        record.date_display(),
        record.time_display(),
    )
}

/// Append-only text log of confirmed reservations.
///
/// Never truncates or rewrites existing content. Appends are serialized so
/// blocks from concurrent completions never interleave.
#[derive(Debug)]
pub struct FileReservationLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileReservationLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Reservation log: {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReservationSink for FileReservationLog {
    async fn append(&self, record: &ReservationRecord) -> anyhow::Result<()> {
        let block = format_record(record);
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(block.as_bytes()).await?;
        file.sync_data().await?;

        debug!("Appended reservation for {} to {}", record.name, self.path.display());
        Ok(())
    }
}
