use std::sync::Mutex;
use std::time::{Duration, Instant};

use immprune_core::{CompareObserver, Locale, Stage};
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];
const MAX_ITEM_WIDTH: usize = 42;

/// Spinner for the blocking fetch/read stages, bar for matching.
pub struct ConsoleObserver {
    locale: Locale,
    spinner: Mutex<Option<ProgressBar>>,
    bar: Mutex<Option<ProgressBar>>,
    match_started: Mutex<Option<Instant>>,
}

impl ConsoleObserver {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            spinner: Mutex::new(None),
            bar: Mutex::new(None),
            match_started: Mutex::new(None),
        }
    }

    fn labels(&self, stage: Stage) -> (&'static str, &'static str) {
        match stage {
            Stage::Remote => (self.locale.scanning_remote(), self.locale.scanning_remote_done()),
            Stage::Local => (self.locale.reading_local(), self.locale.reading_local_done()),
            Stage::Match => (self.locale.matching(), self.locale.matching()),
        }
    }

    fn start_spinner(&self, label: &str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style.tick_strings(SPINNER_FRAMES));
        }
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(pb);
        }
    }

    /// Stops the ticker thread and clears its line before anything else is printed.
    fn stop_spinner(&self) {
        if let Some(pb) = self.spinner.lock().ok().and_then(|mut slot| slot.take()) {
            pb.finish_and_clear();
        }
    }

    fn stop_bar(&self) {
        if let Some(pb) = self.bar.lock().ok().and_then(|mut slot| slot.take()) {
            pb.finish_and_clear();
        }
    }
}

fn shorten(item: &str) -> String {
    if item.chars().count() > MAX_ITEM_WIDTH {
        let head: String = item.chars().take(MAX_ITEM_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        item.to_string()
    }
}

impl CompareObserver for ConsoleObserver {
    fn stage_started(&self, stage: Stage) {
        match stage {
            Stage::Remote | Stage::Local => self.start_spinner(self.labels(stage).0),
            Stage::Match => {
                if let Ok(mut started) = self.match_started.lock() {
                    *started = Some(Instant::now());
                }
            }
        }
    }

    fn stage_finished(&self, stage: Stage, ok: bool) {
        let (_, done) = self.labels(stage);
        match stage {
            Stage::Remote | Stage::Local => {
                self.stop_spinner();
                if ok {
                    eprintln!("✨ {}", done);
                } else {
                    eprintln!("💥 {} failed", done);
                }
            }
            Stage::Match => {
                self.stop_bar();
                let elapsed = self
                    .match_started
                    .lock()
                    .ok()
                    .and_then(|s| *s)
                    .map(|s| s.elapsed())
                    .unwrap_or_default();
                eprintln!("{} complete in {:.1}s", done, elapsed.as_secs_f64());
            }
        }
    }

    fn progress(&self, _stage: &str, current: u64, total: u64, message: &str) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let pb = slot.get_or_insert_with(|| {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::with_template("{prefix} {percent:>3}% ({pos}/{len}) ETA {eta}  {msg}") {
                pb.set_style(style);
            }
            pb.set_prefix(self.locale.matching());
            pb
        });
        pb.set_position(current + 1);
        pb.set_message(shorten(message));
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        self.stop_spinner();
        self.stop_bar();
    }
}
