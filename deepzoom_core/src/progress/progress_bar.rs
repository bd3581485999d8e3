//! Terminal progress bar for tile rendering.
//!
//! One line on stderr: message, bar with sub-character precision, tiles done and total,
//! percentage with two decimals, tile rate and ETA. Redraws are throttled, so the bar may be
//! updated from every tile completion.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

struct Inner {
	message: String,
	len: u64,
	pos: u64,
	start: Instant,
	last_draw: Option<Instant>,
	finished: bool,
}

impl Inner {
	fn new(message: &str, len: u64) -> Self {
		Inner {
			message: message.to_string(),
			len,
			pos: 0,
			start: Instant::now(),
			last_draw: None,
			finished: false,
		}
	}

	fn redraw(&mut self, force: bool) {
		if !force && self.last_draw.is_some_and(|last| last.elapsed() < REDRAW_INTERVAL) {
			return;
		}
		self.last_draw = Some(Instant::now());
		let line = self.render_line(terminal_width());
		write_stderr(&format!("\r\x1b[2K{line}"));
	}

	fn render_line(&self, width: usize) -> String {
		let len = self.len.max(1);
		let pos = self.pos.min(len);
		let elapsed = self.start.elapsed().as_secs_f64();
		let rate = if elapsed > 0.0 { pos as f64 / elapsed } else { 0.0 };
		let eta = if rate > 0.0 { (len - pos) as f64 / rate } else { 0.0 };

		let mut tail = String::new();
		let _ = write!(
			tail,
			"▏{pos}/{} {:>6.2}% {:>7} {:>6}",
			self.len,
			percent(pos, len),
			format_rate(rate),
			format_eta(Duration::from_secs_f64(eta))
		);
		let head = format!("{}▕", self.message);
		let bar_width = width.saturating_sub(head.chars().count() + tail.chars().count());
		format!("{head}{}{tail}", make_bar(pos, len, bar_width))
	}
}

/// A terminal progress bar handle, cloneable and thread-safe.
#[derive(Clone)]
pub struct ProgressBar {
	inner: Arc<Mutex<Inner>>,
}

impl ProgressBar {
	/// Initialize the bar with a message and maximum value.
	pub fn new(message: &str, max_value: u64) -> ProgressBar {
		let progress = ProgressBar {
			inner: Arc::new(Mutex::new(Inner::new(message, max_value))),
		};
		progress.update(|inner| inner.redraw(true));
		progress
	}

	fn update(&self, f: impl FnOnce(&mut Inner)) {
		let mut inner = self.inner.lock().unwrap();
		f(&mut inner);
	}

	pub fn set_message(&self, message: &str) {
		self.update(|inner| {
			inner.message = message.to_string();
			inner.redraw(true);
		});
	}

	/// Set the absolute position.
	pub fn set_position(&self, value: u64) {
		self.update(|inner| {
			inner.pos = value.min(inner.len);
			inner.redraw(false);
		});
	}

	/// Increment by `value`.
	pub fn inc(&self, value: u64) {
		self.update(|inner| {
			inner.pos = inner.pos.saturating_add(value).min(inner.len);
			inner.redraw(false);
		});
	}

	pub fn position(&self) -> u64 {
		self.inner.lock().unwrap().pos
	}

	/// Finish the bar: draw the final state and move to the next line.
	///
	/// The position is left as it is, so a bar whose tiles partly failed does not claim 100%.
	pub fn finish(&self) {
		self.update(|inner| {
			if inner.finished {
				return;
			}
			inner.finished = true;
			inner.redraw(true);
			write_stderr("\n");
		});
	}
}

#[allow(unused_variables)]
fn write_stderr(text: &str) {
	#[cfg(not(any(test, feature = "test")))]
	{
		use std::io::Write;
		let mut output = std::io::stderr();
		let _ = output.write_all(text.as_bytes());
		let _ = output.flush();
	}
}

fn terminal_width() -> usize {
	terminal_size::terminal_size().map_or(80, |(width, _)| usize::from(width.0.max(20)))
}

fn percent(pos: u64, len: u64) -> f64 {
	pos as f64 * 100.0 / len.max(1) as f64
}

fn make_bar(pos: u64, len: u64, width: usize) -> String {
	// eighths of a cell, thinnest first
	const PARTIALS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

	let eighths = ((pos as f64 / len.max(1) as f64).clamp(0.0, 1.0) * (width * 8) as f64) as usize;
	let full = eighths / 8;
	let mut bar: String = "█".repeat(full);
	if full < width {
		bar.push(PARTIALS[eighths % 8]);
		bar.push_str(&" ".repeat(width - full - 1));
	}
	bar
}

fn format_rate(per_sec: f64) -> String {
	if !per_sec.is_finite() {
		return "--/s".to_string();
	}
	let (value, unit) = match per_sec.abs() {
		v if v >= 1e6 => (per_sec / 1e6, "M"),
		v if v >= 1e3 => (per_sec / 1e3, "k"),
		_ => return format!("{per_sec:.0}/s"),
	};
	format!("{value:.1}{unit}/s")
}

fn format_eta(d: Duration) -> String {
	let total = d.as_secs();
	let (hours, minutes, seconds) = (total / 3_600, (total % 3_600) / 60, total % 60);
	match total {
		0..60 => format!("{seconds}s"),
		60..3_600 => format!("{minutes:02}:{seconds:02}"),
		_ => format!("{hours}:{minutes:02}:{seconds:02}"),
	}
}
