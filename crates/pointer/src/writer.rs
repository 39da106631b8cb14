//! Append-only action writer for crash-safe action logging.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use facecursor_common::error::{FacecursorError, FacecursorResult};
use facecursor_model::action::{ActionStreamHeader, PointerAction};

/// Flush cadence, in actions.
const FLUSH_EVERY: u64 = 500;

/// Writes pointer actions to a JSONL file.
pub struct ActionWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    actions_written: u64,
}

impl ActionWriter {
    /// Create the file (truncating) and write the header as the first line.
    pub fn new(path: PathBuf, header: &ActionStreamHeader) -> FacecursorResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| FacecursorError::pointer(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            actions_written: 0,
        })
    }

    pub fn write_action(&mut self, action: &PointerAction) -> FacecursorResult<()> {
        let json = serde_json::to_string(action)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| FacecursorError::pointer(format!("Failed to write action: {e}")))?;
        self.actions_written += 1;

        if self.actions_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> FacecursorResult<()> {
        self.writer
            .flush()
            .map_err(|e| FacecursorError::pointer(format!("Failed to flush actions: {e}")))
    }

    pub fn actions_written(&self) -> u64 {
        self.actions_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ActionWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecursor_model::action::parse_actions;

    #[test]
    fn test_action_writer_roundtrip() {
        let dir = std::env::temp_dir().join("facecursor_test_action_writer");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("nested").join("actions.jsonl");
        let header = ActionStreamHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: "2026-01-01T00:00:00Z".to_string(),
            screen_width: 1920,
            screen_height: 1080,
        };

        {
            let mut writer = ActionWriter::new(path.clone(), &header).unwrap();
            writer
                .write_action(&PointerAction::move_to(0, 960.0, 540.0))
                .unwrap();
            writer
                .write_action(&PointerAction::down(1_000_000_000, 960.0, 540.0))
                .unwrap();
            writer
                .write_action(&PointerAction::up(1_500_000_000, 970.0, 540.0))
                .unwrap();
            assert_eq!(writer.actions_written(), 3);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("# "));

        let actions = parse_actions(&content).unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[2], PointerAction::up(1_500_000_000, 970.0, 540.0));

        std::fs::remove_dir_all(&dir).ok();
    }
}
