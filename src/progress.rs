use archup::model::{STAGE_COMPLETED, STAGE_RUNNING, STAGE_STARTING};
use archup::{BackupNotifier, BackupProgress};
use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Notifier rendering backup progress as an indicatif bar, one bar per run.
pub struct CliNotifier {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliNotifier {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl BackupNotifier for CliNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.finish_bar();
        eprintln!("{} {}", style(format!("[{}]", title)).bold().cyan(), message);
    }

    fn progress(&self, label: &str, progress: &BackupProgress) {
        match progress.state {
            STAGE_STARTING => {
                let pb = ProgressBar::new(progress.total_items as u64);
                pb.set_style(
                    ProgressStyle::with_template(
                        "  {spinner:.cyan} {prefix:.bold} [{bar:30.cyan/dim}] {pos}/{len} files {msg}",
                    )
                    .unwrap()
                    .progress_chars("━╸─")
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
                );
                pb.set_prefix(label.to_string());
                pb.enable_steady_tick(Duration::from_millis(80));
                self.set_bar(pb);
            }
            STAGE_RUNNING => {
                let guard = self.bar.lock().unwrap();
                if let Some(pb) = guard.as_ref() {
                    pb.set_position(progress.items_processed as u64);
                    pb.set_message(format!(
                        "({} / {}, {:.0}% by size)",
                        HumanBytes(progress.bytes_copied),
                        HumanBytes(progress.total_bytes),
                        progress.percent_bytes(),
                    ));
                }
            }
            STAGE_COMPLETED => {
                self.finish_bar();
                eprintln!(
                    "  \x1b[32m✓\x1b[0m {}: {} of {} files, {} copied",
                    label,
                    progress.items_processed,
                    progress.total_items,
                    HumanBytes(progress.bytes_copied),
                );
            }
            _ => {}
        }
    }
}
