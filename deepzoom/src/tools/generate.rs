use anyhow::{Result, bail};
use deepzoom::{
	config::{JobFile, JobSettings, RawTileSize},
	core::{EventBus, PyramidEvent, Rotation, progress::ProgressBar},
	image::{DynamicImageEngine, ImageEngine},
	input::resolve_input,
	pipeline::{JobParameters, JobQueue, JobReport},
};
use std::{
	path::PathBuf,
	sync::{Arc, Mutex},
};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// source images, directories of images, or <directory>#<n> to pick the n-th image of a directory
	#[arg(value_name = "INPUT")]
	inputs: Vec<String>,

	/// directory the pyramids are written to [default: output]
	#[arg(long, short, value_name = "DIR", env = "DEEPZOOM_OUTPUT", display_order = 1)]
	output: Option<PathBuf>,

	/// map name, defaults to the image file name without extension
	#[arg(long, short, display_order = 1)]
	name: Option<String>,

	/// YAML job file; its settings win over the flags given here
	#[arg(long, short, value_name = "FILE", display_order = 1)]
	config: Option<PathBuf>,

	/// rotate the source clockwise: 0, 90, 180 or 270
	#[arg(long, short, value_name = "DEG", env = "DEEPZOOM_ROTATION", display_order = 2)]
	rotation: Option<String>,

	/// smallest acceptable tile size [default: 200]
	#[arg(long, value_name = "int", display_order = 2)]
	min_tile_size: Option<u32>,

	/// largest acceptable tile size [default: 300]
	#[arg(long, value_name = "int", display_order = 2)]
	max_tile_size: Option<u32>,

	/// use exactly this tile size instead of picking one from the range
	#[arg(long, short, value_name = "int", env = "DEEPZOOM_TILE_SIZE", display_order = 2)]
	tile_size: Option<String>,

	/// tile size used when the range holds no usable size [default: 256]
	#[arg(long, value_name = "int", display_order = 2)]
	fallback_tile_size: Option<u32>,

	/// lowest zoom level to generate [default: 0]
	#[arg(long, value_name = "int", env = "DEEPZOOM_MIN_ZOOM", display_order = 3)]
	min_zoom: Option<u8>,

	/// highest zoom level to generate, capped to what the image supports
	#[arg(long, value_name = "int", env = "DEEPZOOM_MAX_ZOOM", display_order = 3)]
	max_zoom: Option<u8>,

	/// maximum number of parallel workers [default: number of CPUs]
	#[arg(long, short = 'j', value_name = "int", env = "DEEPZOOM_THREADS", display_order = 3)]
	threads: Option<usize>,

	/// do not draw a progress bar
	#[arg(long, display_order = 4)]
	no_progress: bool,
}

impl Subcommand {
	fn settings(&self) -> JobSettings {
		JobSettings {
			image: None,
			name: None,
			output: self.output.clone(),
			rotation: None,
			min_tile_size: self.min_tile_size,
			max_tile_size: self.max_tile_size,
			tile_size: self.tile_size.clone().map(RawTileSize::Text),
			fallback_tile_size: self.fallback_tile_size,
			min_zoom: self.min_zoom,
			max_zoom: self.max_zoom,
			threads: self.threads,
		}
	}

	/// Fill in the rotation from the command line if the job has none of its own.
	///
	/// Checked per job, so a bad value only fails the jobs that would use it.
	fn with_rotation(&self, mut job: JobSettings) -> Result<JobSettings> {
		if job.rotation.is_none()
			&& let Some(rotation) = &self.rotation
		{
			job.rotation = Some(rotation.parse::<Rotation>()?.degrees());
		}
		Ok(job)
	}

	/// Expand inputs and the job file into job parameters. Inputs that cannot be resolved are
	/// returned as errors, labelled with the input.
	fn plan_jobs(&self) -> Result<Vec<(String, Result<JobParameters>)>> {
		let settings = self.settings();
		let mut planned = Vec::new();

		for input in &self.inputs {
			match resolve_input(input) {
				Ok(images) => {
					if self.name.is_some() && images.len() > 1 {
						bail!("--name needs a single image, but '{input}' stands for {}", images.len());
					}
					for image in images {
						let settings = JobSettings {
							name: self.name.clone(),
							..settings.clone()
						};
						let parameters = self
							.with_rotation(settings)
							.and_then(|settings| settings.to_parameters(&image));
						planned.push((image.display().to_string(), parameters));
					}
				}
				Err(error) => planned.push((input.clone(), Err(error))),
			}
		}

		if let Some(path) = &self.config {
			let job_file = JobFile::from_path(path)?;
			for job in job_file.merged_jobs(&settings) {
				let Some(image) = job.image.clone() else {
					continue;
				};
				let parameters = self.with_rotation(job).and_then(|job| job.to_parameters(&image));
				planned.push((image.display().to_string(), parameters));
			}
		}

		Ok(planned)
	}
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let planned = arguments.plan_jobs()?;
	if planned.is_empty() {
		bail!("nothing to do, give at least one INPUT or a --config file");
	}

	let events = EventBus::new();
	if !arguments.no_progress {
		attach_progress_bar(&events);
	}

	let mut queue = JobQueue::new(Arc::new(DynamicImageEngine::new()) as Arc<dyn ImageEngine>, events);
	let mut failed_jobs = 0;
	for (label, parameters) in planned {
		match parameters {
			Ok(parameters) => queue.push(parameters),
			Err(error) => {
				eprintln!("{label}: {error:#}");
				failed_jobs += 1;
			}
		}
	}

	let total_jobs = queue.len() + failed_jobs;
	let mut failed_tiles = 0;
	for result in queue.run().await {
		match result {
			Ok(report) => {
				eprintln!("{}", summary_line(&report));
				failed_tiles += report.failed_tiles.len();
			}
			Err(error) => {
				eprintln!("{error:#}");
				failed_jobs += 1;
			}
		}
	}

	if failed_jobs > 0 {
		bail!("{failed_jobs} of {total_jobs} jobs failed");
	}
	if failed_tiles > 0 {
		bail!("{failed_tiles} tiles could not be written");
	}
	Ok(())
}

fn summary_line(report: &JobReport) -> String {
	let plan = &report.plan;
	let mut line = format!(
		"{}: {} tiles written, tile size {}, zoom {}-{}",
		report.map_name, report.tiles_written, plan.tile_size, plan.min_zoom, plan.max_zoom
	);
	if !report.failed_tiles.is_empty() {
		line.push_str(&format!(", {} failed", report.failed_tiles.len()));
		for failure in &report.failed_tiles {
			line.push_str(&format!("\n  {}: {}", failure.coord, failure.message));
		}
	}
	line
}

/// Draw one progress bar per job on stderr.
fn attach_progress_bar(events: &EventBus) {
	let current: Arc<Mutex<Option<(String, ProgressBar)>>> = Arc::new(Mutex::new(None));
	events.subscribe(move |event| {
		let mut current = current.lock().unwrap();
		match event {
			PyramidEvent::JobStart { map_name, total_tiles } => {
				*current = Some((map_name.clone(), ProgressBar::new(map_name, *total_tiles)));
			}
			PyramidEvent::LevelStart { level, .. } => {
				if let Some((map_name, bar)) = current.as_ref() {
					bar.set_message(&format!("{map_name} z{level}"));
				}
			}
			PyramidEvent::TileComplete { .. } | PyramidEvent::TileFailed { .. } => {
				if let Some((_, bar)) = current.as_ref() {
					bar.inc(1);
				}
			}
			PyramidEvent::JobFinish { .. } => {
				if let Some((_, bar)) = current.take() {
					bar.finish();
				}
			}
			PyramidEvent::LevelComplete { .. } => {}
		}
	});
}
